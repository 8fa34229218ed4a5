//! Package resolution for module identifiers.
//!
//! Maps an identifier to the nearest installed package over a [`SearchPaths`]
//! list, reading `package.json` through a [`PkgJsonCache`].
//!
//! [`SearchPaths`]: crate::paths::SearchPaths

mod locate;
mod pkg_json_cache;

pub use locate::{
    IdentifierKind, LocateReason, Located, PackageDescriptor, PackageLocator, PACKAGE_JSON,
};
pub use pkg_json_cache::{MemoryPkgJsonCache, NoPkgJsonCache, PkgJsonCache, PkgJsonStamp};
