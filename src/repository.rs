//! # Repository Scanning
//!
//! A repository is a folder of package folders. Scanning it yields the
//! package folders, the class definition files their manifests reference,
//! and the class identifiers those files define.
//!
//! Passing a file instead of a folder (typically a `package.xml`) treats
//! the folder containing it as the only package.
//!
//! Package folders come back in directory iteration order. Callers that
//! need a stable order sort the result themselves.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::definition::ClassDocument;
use crate::error::{Error, Result};
use crate::manifest::Package;

/// A folder of packages on disk.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    /// Fails when `root` does not exist.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(Error::not_found("Repository", root.display().to_string()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate package folders: the immediate subdirectories of the root,
    /// or the parent folder when the root is a file.
    pub fn package_paths(&self) -> Result<Vec<PathBuf>> {
        if self.root.is_file() {
            let parent = match self.root.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            return Ok(vec![parent]);
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                paths.push(entry.path());
            }
        }
        Ok(paths)
    }

    /// Loaded packages. Folders without a manifest are skipped.
    pub fn packages(&self) -> Result<Vec<Package>> {
        let mut packages = Vec::new();
        for path in self.package_paths()? {
            if !Package::is_package(&path) {
                debug!("Skipping {}: no manifest", path.display());
                continue;
            }
            packages.push(Package::load(&path)?);
        }
        Ok(packages)
    }

    /// Every existing class definition file referenced by a package
    /// manifest.
    pub fn class_definition_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .packages()?
            .iter()
            .flat_map(|package| package.class_definition_files())
            .collect())
    }

    /// Identifiers of all classes defined in the repository. A definition
    /// that does not parse fails the whole call.
    pub fn available_class_identifiers(&self) -> Result<Vec<String>> {
        self.class_definition_files()?
            .iter()
            .map(|file| ClassDocument::open(file)?.identifier())
            .collect()
    }
}
