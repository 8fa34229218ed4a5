//! `typeprep prepare` command implementation.
//!
//! Resolves the project's active modules and writes the type reference
//! declaration file.

use miette::Result;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use typeprep_core::paths::{normalize_lexically, relative_to};
use typeprep_core::{
    run_prepare, Config, Error, PrepareInput, PrepareOutput, ProjectConfig, ResolutionOutcome,
    DEFAULT_GENERATOR,
};

/// Parsed `prepare` arguments.
#[derive(Debug, Clone)]
pub struct PrepareAction {
    /// Project root (absolute or relative to the working directory).
    pub root: PathBuf,
    /// Explicit project config file.
    pub config: Option<PathBuf>,
    /// Extra package directories, searched after the configured ones.
    pub modules_dir: Vec<PathBuf>,
    /// Extra module identifiers, resolved after the configured ones.
    pub modules: Vec<String>,
    /// Output file override.
    pub output: Option<PathBuf>,
    /// Header comment command label.
    pub generator: Option<String>,
}

/// Run the prepare command.
pub fn run(config: &Config, action: PrepareAction) -> Result<()> {
    let root = normalize_lexically(&config.resolve(&action.root));
    let span = tracing::info_span!("prepare", cmd = "prepare", root = %root.display());
    let _guard = span.enter();

    match execute(config, &root, action) {
        Ok(output) => {
            print_success(config, &output);
            Ok(())
        }
        Err(e) => {
            if config.json_logs {
                println!(
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": {
                            "code": e.code(),
                            "message": e.to_string()
                        }
                    })
                );
                std::process::exit(1);
            }
            Err(miette::miette!(code = e.code(), "{e}"))
        }
    }
}

fn execute(config: &Config, root: &Path, action: PrepareAction) -> Result<PrepareOutput, Error> {
    if !root.is_dir() {
        return Err(Error::InvalidRoot {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let (config_file, project) = ProjectConfig::load(root, action.config.as_deref())?;
    match &config_file {
        Some(path) => debug!(config = %path.display(), "loaded project config"),
        None => debug!("no project config found, using defaults"),
    }

    let mut identifiers = project.identifiers();
    identifiers.extend(action.modules);

    let mut extra_dirs = project.modules_dir.clone();
    extra_dirs.extend(action.modules_dir.iter().map(|dir| config.resolve(dir)));

    let declaration_path = action
        .output
        .map_or_else(|| project.declaration_path(root), |p| config.resolve(&p));

    let input = PrepareInput::new(root, identifiers)
        .with_extra_dirs(extra_dirs)
        .with_declaration_path(declaration_path)
        .with_generator(action.generator.as_deref().unwrap_or(DEFAULT_GENERATOR));

    let hook = project.extra_references_hook();
    let output = run_prepare(&input, &hook)?;

    for resolution in &output.resolutions {
        debug!(
            identifier = %resolution.identifier,
            outcome = resolution.outcome.as_str(),
            reason = resolution.reason.unwrap_or("-"),
            tried = resolution.tried.len(),
            "resolved module"
        );
    }

    let unresolved = output
        .resolutions
        .iter()
        .filter(|r| r.outcome == ResolutionOutcome::Unresolved)
        .count();
    info!(
        references = output.references.len(),
        identifiers = output.resolutions.len(),
        unresolved,
        search_paths = output.search_paths.len(),
        "generated declarations"
    );

    Ok(output)
}

fn print_success(config: &Config, output: &PrepareOutput) {
    if config.json_logs {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "declaration": output.declaration_path.to_string_lossy(),
                "references": output.references,
                "lines": output.references.iter().map(|r| r.render()).collect::<Vec<_>>(),
                "resolutions": output.resolutions,
                "search_paths": output
                    .search_paths
                    .iter()
                    .map(|p| p.to_string_lossy())
                    .collect::<Vec<_>>(),
            })
        );
        return;
    }

    let shown = display_path(&output.declaration_path, &config.cwd);
    if std::io::stdout().is_terminal() {
        println!("Generated \x1b[36m{shown}\x1b[0m");
    } else {
        println!("Generated {shown}");
    }
}

/// `path` relative to `base`, or as given when the two share no root.
fn display_path(path: &Path, base: &Path) -> String {
    relative_to(path, base).map_or_else(
        || path.display().to_string(),
        |relative| relative.display().to_string(),
    )
}
