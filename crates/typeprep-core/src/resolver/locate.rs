//! Package locator.
//!
//! Finds the nearest installed package for a module identifier:
//! - Bare identifiers (`pkg`, `pkg/sub`, `@scope/pkg`) are looked up as
//!   `<search dir>/<name>/package.json`, trying the full identifier first and
//!   then its parents within the package namespace
//! - Relative path identifiers (`./x/y`, `../x`) check `<path>/package.json`
//!   and then each parent inside the identifier, stopping before the root
//! - Absolute path identifiers only check `<path>/package.json`
//!
//! Lookup problems never escape as errors. They are reported through
//! [`LocateReason`] and the identifier simply has no package.

use super::pkg_json_cache::PkgJsonCache;
use crate::paths::{normalize_lexically, SearchPaths};
use serde_json::Value;
use std::path::{Path, PathBuf};
use typeprep_util::fs::read_to_string_lossy;

/// Package manifest file name.
pub const PACKAGE_JSON: &str = "package.json";

/// Maximum number of tried manifest paths to record.
const MAX_TRIED_PATHS: usize = 20;

/// How an identifier is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Package name, optionally with a subpath.
    Bare,
    /// Relative or absolute filesystem path.
    Path,
}

impl IdentifierKind {
    /// Classify an identifier. Returns `None` for an empty identifier.
    #[must_use]
    pub fn of(identifier: &str) -> Option<Self> {
        if identifier.is_empty() {
            return None;
        }

        let relative = identifier == "."
            || identifier == ".."
            || identifier.starts_with("./")
            || identifier.starts_with("../")
            || identifier.starts_with(".\\")
            || identifier.starts_with("..\\");

        if relative || is_absolute_path(identifier) {
            Some(Self::Path)
        } else {
            Some(Self::Bare)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::Path => "path",
        }
    }
}

/// Check if an identifier is an absolute path on any platform.
fn is_absolute_path(identifier: &str) -> bool {
    if identifier.starts_with('/') || identifier.starts_with("\\\\") {
        return true;
    }

    // Windows drive: C:\ or C:/
    let bytes = identifier.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Why an identifier has no package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateReason {
    /// Empty identifier or a bare identifier with `.`/`..`/empty segments.
    SpecifierInvalid,
    /// No manifest in any candidate location.
    NotFound,
    /// Manifests were found but none could be read or parsed.
    PackageJsonInvalid,
    /// The nearest manifest has no usable `name`.
    PackageNameMissing,
}

impl LocateReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpecifierInvalid => "SPECIFIER_INVALID",
            Self::NotFound => "NOT_FOUND",
            Self::PackageJsonInvalid => "PACKAGE_JSON_INVALID",
            Self::PackageNameMissing => "PACKAGE_NAME_MISSING",
        }
    }
}

impl std::fmt::Display for LocateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Declared `name` from package.json.
    pub name: String,
    /// Package directory.
    pub dir: PathBuf,
    /// Path of the package.json that was read.
    pub manifest: PathBuf,
}

/// Locator result.
#[derive(Debug, Clone)]
pub struct Located {
    /// The package, if one was found.
    pub package: Option<PackageDescriptor>,
    /// Reason code when no package was found.
    pub reason: Option<LocateReason>,
    /// Manifest paths tried (capped).
    pub tried: Vec<PathBuf>,
}

impl Located {
    fn found(package: PackageDescriptor, tried: Vec<PathBuf>) -> Self {
        Self {
            package: Some(package),
            reason: None,
            tried,
        }
    }

    fn missing(reason: LocateReason, tried: Vec<PathBuf>) -> Self {
        Self {
            package: None,
            reason: Some(reason),
            tried,
        }
    }
}

enum Manifest {
    Missing,
    Invalid,
    Parsed(Value),
}

/// Looks up installed packages over a fixed set of search paths.
#[derive(Debug, Clone, Copy)]
pub struct PackageLocator<'a> {
    search_paths: &'a SearchPaths,
    cache: &'a dyn PkgJsonCache,
}

impl<'a> PackageLocator<'a> {
    #[must_use]
    pub fn new(search_paths: &'a SearchPaths, cache: &'a dyn PkgJsonCache) -> Self {
        Self {
            search_paths,
            cache,
        }
    }

    /// Project root that relative path identifiers are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.search_paths.root()
    }

    #[must_use]
    pub fn search_paths(&self) -> &SearchPaths {
        self.search_paths
    }

    /// Resolve a path identifier against the root.
    #[must_use]
    pub fn resolve_path(&self, identifier: &str) -> PathBuf {
        normalize_lexically(&self.root().join(identifier))
    }

    /// Find the nearest package for `identifier`.
    #[must_use]
    pub fn locate(&self, identifier: &str) -> Located {
        let mut tried = Vec::new();

        match IdentifierKind::of(identifier) {
            None => Located::missing(LocateReason::SpecifierInvalid, tried),
            Some(IdentifierKind::Path) => self.locate_path(identifier, tried),
            Some(IdentifierKind::Bare) => self.locate_bare(identifier, tried),
        }
    }

    fn locate_path(&self, identifier: &str, mut tried: Vec<PathBuf>) -> Located {
        let mut saw_invalid = false;

        for dir in path_candidates(identifier) {
            let dir = normalize_lexically(&self.root().join(dir));
            let manifest = dir.join(PACKAGE_JSON);
            if dir == self.root() || tried.contains(&manifest) {
                continue;
            }
            add_tried(&mut tried, &manifest);

            match self.read_manifest(&manifest) {
                Manifest::Parsed(value) => return package_from_manifest(&value, manifest, tried),
                Manifest::Invalid => saw_invalid = true,
                Manifest::Missing => {}
            }
        }

        if saw_invalid {
            Located::missing(LocateReason::PackageJsonInvalid, tried)
        } else {
            Located::missing(LocateReason::NotFound, tried)
        }
    }

    fn locate_bare(&self, identifier: &str, mut tried: Vec<PathBuf>) -> Located {
        let Some(candidates) = package_candidates(identifier) else {
            return Located::missing(LocateReason::SpecifierInvalid, tried);
        };

        let mut saw_invalid = false;

        // Full identifier across every search dir before falling back to its parent
        for candidate in candidates {
            for dir in self.search_paths {
                let manifest = dir.join(candidate).join(PACKAGE_JSON);
                add_tried(&mut tried, &manifest);

                match self.read_manifest(&manifest) {
                    Manifest::Parsed(value) => {
                        return package_from_manifest(&value, manifest, tried);
                    }
                    Manifest::Invalid => saw_invalid = true,
                    Manifest::Missing => {}
                }
            }
        }

        if saw_invalid {
            Located::missing(LocateReason::PackageJsonInvalid, tried)
        } else {
            Located::missing(LocateReason::NotFound, tried)
        }
    }

    /// Read and parse a manifest, using the cache if possible.
    fn read_manifest(&self, path: &Path) -> Manifest {
        if let Some(value) = self.cache.get(path) {
            return Manifest::Parsed(value);
        }

        if !path.is_file() {
            return Manifest::Missing;
        }

        let Ok(content) = read_to_string_lossy(path) else {
            return Manifest::Invalid;
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(value) if value.is_object() => {
                self.cache.set(path, value.clone());
                Manifest::Parsed(value)
            }
            _ => Manifest::Invalid,
        }
    }
}

fn package_from_manifest(value: &Value, manifest: PathBuf, tried: Vec<PathBuf>) -> Located {
    let Some(name) = usable_name(value) else {
        return Located::missing(LocateReason::PackageNameMissing, tried);
    };

    let dir = manifest
        .parent()
        .map_or_else(|| manifest.clone(), Path::to_path_buf);

    Located::found(
        PackageDescriptor {
            name,
            dir,
            manifest,
        },
        tried,
    )
}

/// The manifest's `name`, if it can be written into a reference directive.
fn usable_name(value: &Value) -> Option<String> {
    let name = value.get("name")?.as_str()?.trim();

    if name.is_empty() || name.contains(['"', '\n', '\r']) {
        return None;
    }

    Some(name.to_string())
}

/// Directories to check for a path identifier, nearest first.
///
/// `./a/b/c.ts` yields `./a/b/c.ts`, `./a/b`, `./a`; the root itself is never
/// a candidate. An absolute identifier yields only itself.
fn path_candidates(identifier: &str) -> Vec<&Path> {
    let path = Path::new(identifier);
    if is_absolute_path(identifier) {
        return vec![path];
    }

    let mut candidates = Vec::new();
    let mut current = Some(path);
    while let Some(dir) = current {
        if dir.as_os_str().is_empty() || dir == Path::new(".") {
            break;
        }
        candidates.push(dir);
        current = dir.parent();
    }
    candidates
}

/// Candidate package names for a bare identifier, most specific first.
///
/// `a/b/c` yields `a/b/c`, `a/b`, `a`; `@s/p/x` yields `@s/p/x`, `@s/p`.
/// Returns `None` when a segment is empty, `.` or `..`.
fn package_candidates(identifier: &str) -> Option<Vec<&str>> {
    let identifier = identifier.trim_end_matches('/');

    if identifier
        .split('/')
        .any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return None;
    }

    let min_segments = if identifier.starts_with('@') { 2 } else { 1 };
    let mut candidates = vec![identifier];

    let slashes: Vec<usize> = identifier.match_indices('/').map(|(i, _)| i).collect();
    for (count, &end) in slashes.iter().enumerate().rev() {
        // `count + 1` segments precede this slash
        if count + 1 >= min_segments {
            candidates.push(&identifier[..end]);
        }
    }

    Some(candidates)
}

/// Add a path to tried list (with cap).
fn add_tried(tried: &mut Vec<PathBuf>, path: &Path) {
    if tried.len() < MAX_TRIED_PATHS {
        tried.push(path.to_path_buf());
    }
}
