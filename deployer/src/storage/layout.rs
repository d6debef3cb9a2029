//! Package storage layout

use std::path::PathBuf;

use crate::filesys::dir::Dir;

/// Where package archives are kept: one directory per package date
#[derive(Debug, Clone)]
pub struct PackageLayout {
    /// Root holding the dated package directories
    pub packages_root: PathBuf,
}

impl PackageLayout {
    /// Create a new package layout
    pub fn new(packages_root: impl Into<PathBuf>) -> Self {
        Self {
            packages_root: packages_root.into(),
        }
    }

    /// Directory of the packages built on `package_date`
    pub fn package_dir(&self, package_date: &str) -> Dir {
        Dir::new(&self.packages_root).subdir(package_date)
    }
}
