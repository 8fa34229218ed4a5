//! Integration tests for `typeprep prepare`.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "typeprep-cli", "--bin", "typeprep", "--"]);
    cmd
}

fn install(root: &Path, dir_name: &str, name: &str) {
    let pkg = root.join("node_modules").join(dir_name);
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("package.json"), format!(r#"{{"name": "{name}"}}"#)).unwrap();
}

fn prepare_json(args: &[&str]) -> (bool, serde_json::Value) {
    let output = cargo_bin()
        .arg("--json")
        .arg("prepare")
        .args(args)
        .output()
        .expect("Failed to run prepare command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout should be valid JSON");
    (output.status.success(), json)
}

#[test]
fn test_prepare_scenario_json() {
    let dir = tempdir().unwrap();
    install(dir.path(), "@core/kit", "@core/kit");
    fs::write(dir.path().join("extra.d.ts"), "export {}\n").unwrap();
    fs::write(
        dir.path().join("typeprep.config.json"),
        r#"{
            "coreModules": ["@core/kit"],
            "modules": ["@core/kit", "./extra.d.ts", "missing-thing", ["tuple", {}]]
        }"#,
    )
    .unwrap();

    let root = dir.path().to_string_lossy().into_owned();
    let (ok, json) = prepare_json(&[&root]);

    assert!(ok);
    assert_eq!(json["ok"], true);
    assert_eq!(
        json["lines"],
        serde_json::json!([
            "/// <reference types=\"@core/kit\" />",
            "/// <reference path=\"./extra.d.ts\" />"
        ])
    );

    let content = fs::read_to_string(dir.path().join("nuxt.d.ts")).unwrap();
    assert_eq!(
        content,
        "// Declarations auto generated by `typeprep prepare`. Please do not manually modify this file.\n\
         \n\
         /// <reference types=\"@core/kit\" />\n\
         /// <reference path=\"./extra.d.ts\" />\n"
    );

    let resolutions = json["resolutions"].as_array().unwrap();
    let missing = resolutions
        .iter()
        .find(|r| r["identifier"] == "missing-thing")
        .unwrap();
    assert_eq!(missing["outcome"], "unresolved");
    assert_eq!(missing["reason"], "NOT_FOUND");
}

#[test]
fn test_prepare_flags_and_config_references() {
    let dir = tempdir().unwrap();
    install(dir.path(), "@nuxt/kit", "@nuxt/kit");
    install(dir.path(), "extra-mod", "extra-mod");
    fs::write(
        dir.path().join(".typeprep.json"),
        r#"{"references": {"types": ["vite/client"], "paths": ["./shims.d.ts"]}}"#,
    )
    .unwrap();

    let root = dir.path().to_string_lossy().into_owned();
    let out = dir.path().join("types").join("app.d.ts");
    let out_str = out.to_string_lossy().into_owned();
    let (ok, json) = prepare_json(&[
        &root,
        "--module",
        "extra-mod",
        "--output",
        &out_str,
        "--generator",
        "nuxi prepare",
    ]);

    assert!(ok);
    assert_eq!(
        json["lines"],
        serde_json::json!([
            "/// <reference types=\"@nuxt/kit\" />",
            "/// <reference types=\"extra-mod\" />",
            "/// <reference types=\"vite/client\" />",
            "/// <reference path=\"./shims.d.ts\" />"
        ])
    );

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.starts_with("// Declarations auto generated by `nuxi prepare`."));
    assert!(!dir.path().join("nuxt.d.ts").exists());
}

#[test]
fn test_prepare_invalid_root() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope").to_string_lossy().into_owned();

    let (ok, json) = prepare_json(&[&missing]);

    assert!(!ok);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "PREPARE_ROOT_INVALID");
}

#[test]
fn test_prepare_invalid_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("typeprep.config.json"), "{ modules: ").unwrap();

    let root = dir.path().to_string_lossy().into_owned();
    let (ok, json) = prepare_json(&[&root]);

    assert!(!ok);
    assert_eq!(json["error"]["code"], "PREPARE_CONFIG_INVALID");
    assert!(!dir.path().join("nuxt.d.ts").exists());
}

#[test]
fn test_prepare_human_output() {
    let dir = tempdir().unwrap();

    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .arg("prepare")
        .output()
        .expect("Failed to run prepare command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "Generated nuxt.d.ts");
    assert!(dir.path().join("nuxt.d.ts").is_file());
}

#[test]
fn test_prepare_is_idempotent() {
    let dir = tempdir().unwrap();
    install(dir.path(), "@nuxt/kit", "@nuxt/kit");
    let root = dir.path().to_string_lossy().into_owned();

    let (ok, _) = prepare_json(&[&root]);
    assert!(ok);
    let first = fs::read(dir.path().join("nuxt.d.ts")).unwrap();

    let (ok, _) = prepare_json(&[&root]);
    assert!(ok);
    let second = fs::read(dir.path().join("nuxt.d.ts")).unwrap();

    assert_eq!(first, second);
}
