//! `prepare:types` extension point.

use super::references::ReferenceEntry;
use crate::error::Error;

/// Called once per run, after references are collected and before the
/// declaration file is written. The list may be edited in place.
pub trait PrepareHook {
    fn prepare_types(&self, references: &mut Vec<ReferenceEntry>) -> Result<(), Error>;
}

/// Hook that leaves the list untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl PrepareHook for NoopHook {
    fn prepare_types(&self, _references: &mut Vec<ReferenceEntry>) -> Result<(), Error> {
        Ok(())
    }
}

impl<F> PrepareHook for F
where
    F: Fn(&mut Vec<ReferenceEntry>) -> Result<(), Error>,
{
    fn prepare_types(&self, references: &mut Vec<ReferenceEntry>) -> Result<(), Error> {
        self(references)
    }
}

/// Appends the extra references declared in the project config.
#[derive(Debug, Clone, Default)]
pub struct ExtraReferencesHook {
    types: Vec<String>,
    paths: Vec<String>,
}

impl ExtraReferencesHook {
    #[must_use]
    pub fn new(types: Vec<String>, paths: Vec<String>) -> Self {
        Self { types, paths }
    }
}

impl PrepareHook for ExtraReferencesHook {
    fn prepare_types(&self, references: &mut Vec<ReferenceEntry>) -> Result<(), Error> {
        references.extend(self.types.iter().map(ReferenceEntry::package));
        references.extend(self.paths.iter().map(ReferenceEntry::path));
        Ok(())
    }
}
