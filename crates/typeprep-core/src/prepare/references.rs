//! Reference collection.
//!
//! Each identifier becomes at most one reference: a package reference when an
//! installed package is found, otherwise a path reference when the identifier
//! names an existing file or directory, otherwise nothing.

use crate::resolver::{IdentifierKind, PackageLocator};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// One `/// <reference ... />` line of the declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReferenceEntry {
    /// `/// <reference types="name" />`
    Package { name: String },
    /// `/// <reference path="path" />`
    Path { path: String },
}

impl ReferenceEntry {
    #[must_use]
    pub fn package(name: impl Into<String>) -> Self {
        Self::Package { name: name.into() }
    }

    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path { path: path.into() }
    }

    /// Whether the value can sit inside a quoted directive attribute.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        let value = match self {
            Self::Package { name } => name,
            Self::Path { path } => path,
        };
        !value.trim().is_empty() && !value.contains(['"', '\n', '\r'])
    }

    /// The directive line, without a trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReferenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package { name } => write!(f, "/// <reference types=\"{name}\" />"),
            Self::Path { path } => write!(f, "/// <reference path=\"{path}\" />"),
        }
    }
}

/// How an identifier was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionOutcome {
    Package,
    Path,
    Unresolved,
}

impl ResolutionOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Path => "path",
            Self::Unresolved => "unresolved",
        }
    }
}

/// Per-identifier resolution record.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub identifier: String,
    pub outcome: ResolutionOutcome,
    pub reference: Option<ReferenceEntry>,
    /// Locator reason code when no package was found.
    pub reason: Option<&'static str>,
    pub package_dir: Option<PathBuf>,
    /// Manifest paths the locator tried (capped).
    pub tried: Vec<PathBuf>,
}

/// Result of [`collect_references`].
#[derive(Debug, Clone)]
pub struct Collected {
    /// Deduplicated references in first-seen order.
    pub references: Vec<ReferenceEntry>,
    /// One record per distinct identifier, in first-seen order.
    pub resolutions: Vec<Resolution>,
}

/// Resolve identifiers to references.
///
/// Distinct identifiers are resolved in parallel; results are assembled in
/// input order before deduplication, so the outcome is the same as resolving
/// them one by one.
#[must_use]
pub fn collect_references(identifiers: &[String], locator: &PackageLocator<'_>) -> Collected {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = identifiers
        .iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect();

    let resolutions: Vec<Resolution> = unique
        .par_iter()
        .map(|id| resolve_identifier(id, locator))
        .collect();

    let references = dedupe_references(
        resolutions
            .iter()
            .filter_map(|r| r.reference.clone())
            .collect(),
    );

    Collected {
        references,
        resolutions,
    }
}

/// Drop entries that cannot be written and later entries whose rendered line
/// was already seen.
#[must_use]
pub fn dedupe_references(references: Vec<ReferenceEntry>) -> Vec<ReferenceEntry> {
    let mut seen = HashSet::new();
    references
        .into_iter()
        .filter(|entry| entry.is_writable() && seen.insert(entry.render()))
        .collect()
}

fn resolve_identifier(identifier: &str, locator: &PackageLocator<'_>) -> Resolution {
    let located = locator.locate(identifier);

    if let Some(package) = located.package {
        return Resolution {
            identifier: identifier.to_string(),
            outcome: ResolutionOutcome::Package,
            reference: Some(ReferenceEntry::package(package.name)),
            reason: None,
            package_dir: Some(package.dir),
            tried: located.tried,
        };
    }

    let path_reference = ReferenceEntry::path(identifier);
    let exists = IdentifierKind::of(identifier).is_some()
        && path_reference.is_writable()
        && locator
            .resolve_path(identifier)
            .try_exists()
            .unwrap_or(false);

    let (outcome, reference) = if exists {
        (
            ResolutionOutcome::Path,
            Some(path_reference),
        )
    } else {
        (ResolutionOutcome::Unresolved, None)
    };

    Resolution {
        identifier: identifier.to_string(),
        outcome,
        reference,
        reason: located.reason.map(|r| r.as_str()),
        package_dir: None,
        tried: located.tried,
    }
}
