#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod paths;
pub mod prepare;
pub mod resolver;
pub mod version;

pub use config::Config;
pub use error::Error;
pub use paths::{build_search_paths, SearchPaths};
pub use prepare::{
    collect_references, dedupe_references, run_prepare, Collected, Declaration,
    ExtraReferencesHook, NoopHook, PrepareHook, PrepareInput, PrepareOutput, ProjectConfig,
    ReferenceEntry, Resolution, ResolutionOutcome, DEFAULT_GENERATOR,
};
pub use resolver::{
    IdentifierKind, LocateReason, Located, MemoryPkgJsonCache, NoPkgJsonCache,
    PackageDescriptor, PackageLocator, PkgJsonCache,
};
pub use version::VERSION;
