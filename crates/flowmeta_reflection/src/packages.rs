//! Packages: groups of classes sharing namespaces.
//!
//! A frozen package is assumed unchanged; its reflection data can be
//! precompiled into one blob and is never re-reflected.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A package and the namespaces its classes live in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageInfo {
    /// Package key, e.g. `Acme.Shop`.
    pub key: String,
    /// Root namespaces of the package's classes.
    pub namespaces: Vec<String>,
}

impl PackageInfo {
    /// Creates a package with one namespace.
    #[must_use]
    pub fn new(key: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            namespaces: vec![namespace.into()],
        }
    }
}

/// Knows the installed packages.
pub trait PackageProvider: Send + Sync {
    /// All available packages.
    fn packages(&self) -> Vec<PackageInfo>;

    /// Returns true if the package is frozen.
    fn is_package_frozen(&self, package_key: &str) -> bool;

    /// Directory holding precompiled reflection blobs (`<key>.dat`).
    fn precompiled_reflection_directory(&self) -> &Path;

    /// Path of a package's precompiled reflection blob.
    fn precompiled_reflection_path(&self, package_key: &str) -> PathBuf {
        self.precompiled_reflection_directory()
            .join(format!("{package_key}.dat"))
    }

    /// Keys of all frozen packages.
    fn frozen_package_keys(&self) -> Vec<String> {
        self.packages()
            .into_iter()
            .filter(|p| self.is_package_frozen(&p.key))
            .map(|p| p.key)
            .collect()
    }
}

/// A fixed list of packages.
#[derive(Clone, Debug)]
pub struct StaticPackages {
    packages: Vec<PackageInfo>,
    frozen: BTreeSet<String>,
    directory: PathBuf,
}

impl StaticPackages {
    /// Creates an empty list storing precompiled blobs in `directory`.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            packages: Vec::new(),
            frozen: BTreeSet::new(),
            directory: directory.into(),
        }
    }

    /// Adds a package.
    #[must_use]
    pub fn with_package(mut self, package: PackageInfo) -> Self {
        self.packages.push(package);
        self
    }

    /// Adds a frozen package.
    #[must_use]
    pub fn with_frozen_package(mut self, package: PackageInfo) -> Self {
        self.frozen.insert(package.key.clone());
        self.packages.push(package);
        self
    }
}

impl PackageProvider for StaticPackages {
    fn packages(&self) -> Vec<PackageInfo> {
        self.packages.clone()
    }

    fn is_package_frozen(&self, package_key: &str) -> bool {
        self.frozen.contains(package_key)
    }

    fn precompiled_reflection_directory(&self) -> &Path {
        &self.directory
    }
}
