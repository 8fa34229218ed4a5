//! The `prepare` pipeline.
//!
//! search paths → package lookup per identifier → dedupe → `prepare:types`
//! hook → declaration file. Either the whole file is written or nothing is.

pub mod config;
mod declaration;
mod hook;
mod references;

pub use config::{ExtraReferences, ProjectConfig, CONFIG_FILES, DEFAULT_DECLARATION};
pub use declaration::{Declaration, DEFAULT_GENERATOR};
pub use hook::{ExtraReferencesHook, NoopHook, PrepareHook};
pub use references::{
    collect_references, dedupe_references, Collected, ReferenceEntry, Resolution,
    ResolutionOutcome,
};

use crate::error::Error;
use crate::paths::{build_search_paths, normalize_lexically};
use crate::resolver::{MemoryPkgJsonCache, PackageLocator};
use std::path::PathBuf;

/// Inputs for one prepare run.
#[derive(Debug, Clone)]
pub struct PrepareInput {
    /// Project root.
    pub root: PathBuf,
    /// Module identifiers in priority order; may repeat.
    pub identifiers: Vec<String>,
    /// Extra package directories searched after the ancestor walk.
    pub extra_dirs: Vec<PathBuf>,
    /// Output file. Relative paths are taken from the root.
    pub declaration_path: PathBuf,
    /// Command name for the header comment.
    pub generator: String,
}

impl PrepareInput {
    /// Input with the default generator label and declaration file name.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, identifiers: Vec<String>) -> Self {
        Self {
            root: root.into(),
            identifiers,
            extra_dirs: Vec::new(),
            declaration_path: PathBuf::from(DEFAULT_DECLARATION),
            generator: DEFAULT_GENERATOR.to_string(),
        }
    }

    #[must_use]
    pub fn with_extra_dirs(mut self, extra_dirs: Vec<PathBuf>) -> Self {
        self.extra_dirs = extra_dirs;
        self
    }

    #[must_use]
    pub fn with_declaration_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.declaration_path = path.into();
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }
}

/// Result of a successful prepare run.
#[derive(Debug, Clone)]
pub struct PrepareOutput {
    /// Absolute path of the written file.
    pub declaration_path: PathBuf,
    /// References as written.
    pub references: Vec<ReferenceEntry>,
    /// Per-identifier resolution records.
    pub resolutions: Vec<Resolution>,
    /// Directories that were searched, in priority order.
    pub search_paths: Vec<PathBuf>,
}

/// Resolve identifiers, run the hook and write the declaration file.
pub fn run_prepare(input: &PrepareInput, hook: &dyn PrepareHook) -> Result<PrepareOutput, Error> {
    let search_paths = build_search_paths(&input.root, &input.extra_dirs)?;
    let declaration_path = normalize_lexically(&search_paths.root().join(&input.declaration_path));

    let cache = MemoryPkgJsonCache::new();
    let locator = PackageLocator::new(&search_paths, &cache);
    let Collected {
        mut references,
        resolutions,
    } = collect_references(&input.identifiers, &locator);

    hook.prepare_types(&mut references)?;
    let references = dedupe_references(references);

    let declaration = Declaration::new(input.generator.clone(), references);
    declaration.emit(&declaration_path)?;

    Ok(PrepareOutput {
        declaration_path,
        references: declaration.references().to_vec(),
        resolutions,
        search_paths: search_paths.as_slice().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PACKAGE_JSON;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn install(node_modules: &Path, dir_name: &str, name: &str) {
        let pkg = node_modules.join(dir_name);
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join(PACKAGE_JSON), format!(r#"{{"name": "{name}"}}"#)).unwrap();
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_scenario_writes_expected_file() {
        let dir = tempdir().unwrap();
        install(&dir.path().join("node_modules"), "@core/kit", "@core/kit");
        fs::write(dir.path().join("extra.d.ts"), "").unwrap();

        let input = PrepareInput::new(
            dir.path(),
            ids(&["@core/kit", "@core/kit", "./extra.d.ts", "missing-thing"]),
        );
        let output = run_prepare(&input, &NoopHook).unwrap();

        assert_eq!(output.declaration_path, dir.path().join("nuxt.d.ts"));
        assert_eq!(
            fs::read_to_string(&output.declaration_path).unwrap(),
            "// Declarations auto generated by `typeprep prepare`. Please do not manually modify this file.\n\
             \n\
             /// <reference types=\"@core/kit\" />\n\
             /// <reference path=\"./extra.d.ts\" />\n"
        );
        assert_eq!(output.resolutions.len(), 3);
    }

    #[test]
    fn test_idempotent() {
        let dir = tempdir().unwrap();
        install(&dir.path().join("node_modules"), "a", "a");
        let input = PrepareInput::new(dir.path(), ids(&["a", "./missing.d.ts"]))
            .with_declaration_path("types/app.d.ts");

        let first = run_prepare(&input, &NoopHook).unwrap();
        let first_bytes = fs::read(&first.declaration_path).unwrap();
        let second = run_prepare(&input, &NoopHook).unwrap();
        let second_bytes = fs::read(&second.declaration_path).unwrap();

        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_hook_sees_and_edits_list_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let dir = tempdir().unwrap();
        install(&dir.path().join("node_modules"), "a", "a");

        let calls = AtomicUsize::new(0);
        let hook = |refs: &mut Vec<ReferenceEntry>| -> Result<(), Error> {
            calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(*refs, vec![ReferenceEntry::package("a")]);
            refs.push(ReferenceEntry::package("vite/client"));
            refs.push(ReferenceEntry::package("a"));
            Ok(())
        };

        let input = PrepareInput::new(dir.path(), ids(&["a"])).with_generator("nuxt prepare");
        let output = run_prepare(&input, &hook).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            output.references,
            vec![ReferenceEntry::package("a"), ReferenceEntry::package("vite/client")]
        );
        let content = fs::read_to_string(&output.declaration_path).unwrap();
        assert!(content.starts_with("// Declarations auto generated by `nuxt prepare`."));
    }

    #[test]
    fn test_hook_references_that_break_directives_are_dropped() {
        let dir = tempdir().unwrap();
        let hook = |refs: &mut Vec<ReferenceEntry>| -> Result<(), Error> {
            refs.push(ReferenceEntry::path("./bad\".d.ts"));
            refs.push(ReferenceEntry::path("./good.d.ts"));
            Ok(())
        };

        let input = PrepareInput::new(dir.path(), Vec::new());
        let output = run_prepare(&input, &hook).unwrap();

        assert_eq!(output.references, vec![ReferenceEntry::path("./good.d.ts")]);
        let content = fs::read_to_string(&output.declaration_path).unwrap();
        assert!(!content.contains("bad"));
    }

    #[test]
    fn test_hook_error_writes_nothing() {
        let dir = tempdir().unwrap();
        let hook =
            |_: &mut Vec<ReferenceEntry>| -> Result<(), Error> { Err(Error::hook("rejected")) };

        let input = PrepareInput::new(dir.path(), ids(&["a"]));
        let err = run_prepare(&input, &hook).unwrap_err();

        assert!(matches!(err, Error::Hook(_)));
        assert!(!dir.path().join("nuxt.d.ts").exists());
    }

    #[test]
    fn test_unwritable_output_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();

        let input =
            PrepareInput::new(dir.path(), Vec::new()).with_declaration_path("blocker/out.d.ts");
        let err = run_prepare(&input, &NoopHook).unwrap_err();
        assert!(matches!(err, Error::Emit { .. }));
    }

    #[test]
    fn test_extra_dirs_searched() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("app");
        fs::create_dir_all(&root).unwrap();
        let framework = dir.path().join("framework").join("node_modules");
        install(&framework, "@core/app", "@core/app");

        let input =
            PrepareInput::new(&root, ids(&["@core/app"])).with_extra_dirs(vec![framework.clone()]);
        let output = run_prepare(&input, &NoopHook).unwrap();

        assert_eq!(output.references, vec![ReferenceEntry::package("@core/app")]);
        assert_eq!(output.search_paths.last(), Some(&framework));
    }
}
