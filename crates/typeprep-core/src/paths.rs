//! Search path construction.
//!
//! Builds the ordered list of directories where installed packages are looked
//! up: `node_modules` at the root and at every ancestor (nearest first),
//! followed by any extra module directories from the project config.

use crate::error::Error;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Conventional package install directory name.
pub const NODE_MODULES: &str = "node_modules";

/// Ordered, deduplicated absolute directories to search for packages.
///
/// Earlier entries win when a package is installed in several places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPaths {
    root: PathBuf,
    dirs: Vec<PathBuf>,
}

impl SearchPaths {
    /// Normalized absolute project root the paths were built from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.dirs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

impl<'a> IntoIterator for &'a SearchPaths {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.dirs.iter()
    }
}

/// Build the search paths for a project root.
///
/// Does not touch the filesystem: candidates may not exist. A relative `root`
/// is made absolute against the process working directory; relative
/// `extra_dirs` are taken relative to the normalized root.
pub fn build_search_paths(root: &Path, extra_dirs: &[PathBuf]) -> Result<SearchPaths, Error> {
    let root = absolute_root(root)?;

    let mut seen = HashSet::new();
    let mut dirs = Vec::new();
    let mut push = |dir: PathBuf| {
        if seen.insert(dir.clone()) {
            dirs.push(dir);
        }
    };

    let mut current = root.clone();
    loop {
        // A node_modules directory never gets a nested node_modules candidate
        if current.file_name().and_then(|n| n.to_str()) != Some(NODE_MODULES) {
            push(current.join(NODE_MODULES));
        }

        if !current.pop() {
            break;
        }
    }

    for dir in extra_dirs {
        let joined = if dir.is_absolute() {
            dir.clone()
        } else {
            root.join(dir)
        };
        push(normalize_lexically(&joined));
    }

    Ok(SearchPaths { root, dirs })
}

/// Make `root` absolute and lexically normalized.
pub fn absolute_root(root: &Path) -> Result<PathBuf, Error> {
    if root.as_os_str().is_empty() {
        return Err(Error::InvalidRoot {
            path: root.to_path_buf(),
            reason: "root directory is empty".to_string(),
        });
    }

    let absolute = std::path::absolute(root).map_err(|e| Error::InvalidRoot {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(normalize_lexically(&absolute))
}

/// Remove `.` components and fold `..` into the preceding component.
///
/// `..` at the filesystem root stays at the root.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// `path` expressed relative to `base`, walking up with `..` where needed.
///
/// Both paths are normalized first. Returns `None` when they share no root
/// (one relative and one absolute, or different Windows prefixes). Equal
/// paths yield `.`.
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = normalize_lexically(path);
    let base = normalize_lexically(base);

    if path.has_root() != base.has_root() {
        return None;
    }

    let mut path_parts = path.components().peekable();
    let mut base_parts = base.components().peekable();
    while let (Some(a), Some(b)) = (path_parts.peek(), base_parts.peek()) {
        if a != b {
            break;
        }
        path_parts.next();
        base_parts.next();
    }

    let mut out = PathBuf::new();
    for part in base_parts {
        match part {
            Component::Normal(_) => out.push(".."),
            // Unmatched prefix or root: the paths live on different roots
            _ => return None,
        }
    }
    for part in path_parts {
        out.push(part.as_os_str());
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    Some(out)
}
