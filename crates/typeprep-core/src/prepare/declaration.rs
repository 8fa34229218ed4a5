//! Declaration file rendering and writing.

use super::references::ReferenceEntry;
use crate::error::Error;
use std::path::Path;
use typeprep_util::fs::{atomic_write, ensure_parent_dir};

/// Command name quoted in the header comment.
pub const DEFAULT_GENERATOR: &str = "typeprep prepare";

/// The generated declaration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    generator: String,
    references: Vec<ReferenceEntry>,
}

impl Declaration {
    #[must_use]
    pub fn new(generator: impl Into<String>, references: Vec<ReferenceEntry>) -> Self {
        Self {
            generator: generator.into(),
            references,
        }
    }

    #[must_use]
    pub fn references(&self) -> &[ReferenceEntry] {
        &self.references
    }

    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "// Declarations auto generated by `{}`. Please do not manually modify this file.",
            self.generator
        )
    }

    /// Header, blank line, one directive per line, trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.references.len() + 3);
        lines.push(self.header());
        lines.push(String::new());
        lines.extend(self.references.iter().map(ReferenceEntry::render));
        lines.push(String::new());
        lines.join("\n")
    }

    /// Replace `path` with the rendered file.
    ///
    /// The write is atomic; on failure the previous file (if any) is intact.
    pub fn emit(&self, path: &Path) -> Result<(), Error> {
        let to_emit_error = |source| Error::Emit {
            path: path.to_path_buf(),
            source,
        };

        ensure_parent_dir(path).map_err(to_emit_error)?;
        atomic_write(path, self.render().as_bytes()).map_err(to_emit_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_render_exact() {
        let declaration = Declaration::new(
            DEFAULT_GENERATOR,
            vec![
                ReferenceEntry::package("@core/kit"),
                ReferenceEntry::path("./extra.d.ts"),
            ],
        );

        assert_eq!(
            declaration.render(),
            "// Declarations auto generated by `typeprep prepare`. Please do not manually modify this file.\n\
             \n\
             /// <reference types=\"@core/kit\" />\n\
             /// <reference path=\"./extra.d.ts\" />\n"
        );
    }

    #[test]
    fn test_render_empty() {
        let declaration = Declaration::new("nuxt prepare", Vec::new());
        assert_eq!(
            declaration.render(),
            "// Declarations auto generated by `nuxt prepare`. Please do not manually modify this file.\n\n"
        );
    }

    #[test]
    fn test_emit_overwrites_and_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".generated").join("types.d.ts");

        Declaration::new(DEFAULT_GENERATOR, vec![ReferenceEntry::package("a")])
            .emit(&path)
            .unwrap();
        Declaration::new(DEFAULT_GENERATOR, vec![ReferenceEntry::package("b")])
            .emit(&path)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("types=\"b\""));
        assert!(!content.contains("types=\"a\""));
    }

    #[test]
    fn test_emit_failure_is_emit_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = Declaration::new(DEFAULT_GENERATOR, Vec::new())
            .emit(&blocker.join("types.d.ts"))
            .unwrap_err();
        assert!(matches!(err, Error::Emit { .. }));
    }
}
