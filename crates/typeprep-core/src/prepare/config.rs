//! Project configuration for `typeprep prepare`.
//!
//! Loads `typeprep.config.json` (or `.typeprep.json`) from the project root.
//! The file decides which modules are active and where the declaration goes.
//!
//! ## Supported format
//!
//! ```json
//! {
//!   "majorVersion": 3,
//!   "buildModules": ["@nuxtjs/tailwindcss", ["@pinia/nuxt", { "autoImports": [] }]],
//!   "modules": ["./modules/local"],
//!   "modulesDir": ["../node_modules"],
//!   "declaration": "nuxt.d.ts",
//!   "references": { "types": ["vite/client"], "paths": ["./shims.d.ts"] }
//! }
//! ```
//!
//! Module entries that are not plain strings (tuples with options, objects)
//! carry no identifier and are skipped.

use super::hook::ExtraReferencesHook;
use crate::error::Error;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Config file names in priority order.
pub const CONFIG_FILES: &[&str] = &["typeprep.config.json", ".typeprep.json"];

/// Default declaration file name, relative to the root.
pub const DEFAULT_DECLARATION: &str = "nuxt.d.ts";

/// Core modules for framework major version 3.
const CORE_MODULES_V3: &[&str] = &["@nuxt/kit", "@nuxt/app", "@nuxt/nitro"];

/// Core modules for every other major version.
const CORE_MODULES_DEFAULT: &[&str] = &["@nuxt/kit"];

/// Extra references appended through the `prepare:types` hook.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtraReferences {
    pub types: Vec<String>,
    pub paths: Vec<String>,
}

/// Parsed project configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Framework major version; selects the default core modules.
    pub major_version: Option<u32>,
    /// Explicit core modules, replacing the version defaults.
    pub core_modules: Option<Vec<String>>,
    pub build_modules: Vec<Value>,
    pub modules: Vec<Value>,
    /// Modules registered by the framework itself.
    #[serde(alias = "_modules")]
    pub internal_modules: Vec<Value>,
    /// Extra directories searched after the ancestor `node_modules` walk.
    pub modules_dir: Vec<PathBuf>,
    /// Declaration file path, relative to the root.
    pub declaration: Option<PathBuf>,
    pub references: ExtraReferences,
}

impl ProjectConfig {
    /// Find a config file in the given root directory.
    #[must_use]
    pub fn find(root: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }

    /// Load configuration for `root`.
    ///
    /// If `config_path` is `Some`, that file must exist. Otherwise the root is
    /// searched and a missing file yields the defaults.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<(Option<PathBuf>, Self), Error> {
        let path = match config_path {
            Some(p) => {
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    root.join(p)
                }
            }
            None => match Self::find(root) {
                Some(p) => p,
                None => return Ok((None, Self::default())),
            },
        };

        let source = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&path, &source)?;

        Ok((Some(path), config))
    }

    /// Parse configuration from JSON source.
    pub fn parse(path: &Path, source: &str) -> Result<Self, Error> {
        serde_json::from_str(source).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Core modules for this project.
    #[must_use]
    pub fn core_modules(&self) -> Vec<String> {
        if let Some(explicit) = &self.core_modules {
            return explicit.clone();
        }

        let defaults = match self.major_version {
            Some(3) => CORE_MODULES_V3,
            _ => CORE_MODULES_DEFAULT,
        };
        defaults.iter().map(|s| (*s).to_string()).collect()
    }

    /// Module identifiers in resolution order: core, build, user, internal.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        let configured = self
            .build_modules
            .iter()
            .chain(&self.modules)
            .chain(&self.internal_modules)
            .filter_map(Value::as_str)
            .map(str::to_string);

        self.core_modules().into_iter().chain(configured).collect()
    }

    /// Declaration output path for `root`.
    #[must_use]
    pub fn declaration_path(&self, root: &Path) -> PathBuf {
        let relative = self
            .declaration
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_DECLARATION));
        root.join(relative)
    }

    /// Hook that appends `references.types` and `references.paths`.
    #[must_use]
    pub fn extra_references_hook(&self) -> ExtraReferencesHook {
        ExtraReferencesHook::new(self.references.types.clone(), self.references.paths.clone())
    }
}
