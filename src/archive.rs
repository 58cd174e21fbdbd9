//! # Binary Package Extraction
//!
//! Binary packages (`.ezpkg`) are tar archives, usually gzip compressed.
//! [`extract_and_transform`] unpacks each one next to the archive into a
//! folder named after the package and normalizes the class definitions it
//! contains so they are pleasant to edit and diff.
//!
//! `blog-1.0-1.ezpkg` unpacks into `blog/`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::{debug, info, warn};
use tar::Archive;

use crate::clock::Clock;
use crate::definition::ClassDocument;
use crate::error::{Error, Result};

/// Extension of binary package files.
pub const PACKAGE_EXTENSION: &str = "ezpkg";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Unpacks an archive into a folder.
pub trait ArchiveExtractor {
    fn extract_to(&self, archive: &Path, destination: &Path) -> Result<()>;
}

/// Tar extraction, gzip decompressed when the file starts with the gzip
/// magic bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    fn extract_to(&self, archive: &Path, destination: &Path) -> Result<()> {
        let archive_error = |message: String| Error::Archive {
            path: archive.to_path_buf(),
            message,
        };

        let mut magic = [0u8; 2];
        let compressed = {
            let mut file = File::open(archive)?;
            file.read_exact(&mut magic).is_ok() && magic == GZIP_MAGIC
        };

        let file = BufReader::new(File::open(archive)?);
        let reader: Box<dyn Read> = if compressed {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        std::fs::create_dir_all(destination)?;
        Archive::new(reader)
            .unpack(destination)
            .map_err(|e| archive_error(e.to_string()))
    }
}

/// The package name of a binary package file: the file name up to the
/// first `-`, or without its extension when there is no `-`.
pub fn package_name_from_file(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    let name = match file_name.split_once('-') {
        Some((name, _)) => name.to_string(),
        None => path.file_stem()?.to_string_lossy().into_owned(),
    };
    (!name.is_empty()).then_some(name)
}

/// One unpacked package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPackage {
    pub archive: PathBuf,
    pub folder: PathBuf,
    /// Number of class definitions normalized.
    pub classes: usize,
}

/// An archive that could not be unpacked or normalized.
#[derive(Debug)]
pub struct ExtractFailure {
    pub archive: PathBuf,
    pub error: Error,
}

/// Result of one extract run. A failing archive does not stop the others.
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub extracted: Vec<ExtractedPackage>,
    pub failed: Vec<ExtractFailure>,
}

/// Extract every `.ezpkg` file matching `pattern` and normalize the class
/// definitions inside.
///
/// Matches with another extension are ignored. A pattern without any match
/// is a [`Error::NotFound`]. Errors of a single archive are logged and
/// recorded in [`ExtractReport::failed`].
pub fn extract_and_transform(
    pattern: &str,
    extractor: &dyn ArchiveExtractor,
    clock: &dyn Clock,
) -> Result<ExtractReport> {
    let matches: Vec<PathBuf> = glob::glob(pattern)?.filter_map(|entry| entry.ok()).collect();
    if matches.is_empty() {
        return Err(Error::not_found("Files matching", pattern));
    }

    let mut report = ExtractReport::default();
    for archive in matches {
        let is_package = archive.is_file()
            && archive
                .extension()
                .is_some_and(|ext| ext == PACKAGE_EXTENSION);
        if !is_package {
            debug!("Skipping {}", archive.display());
            continue;
        }
        match extract_one(&archive, extractor, clock) {
            Ok(package) => report.extracted.push(package),
            Err(error) => {
                warn!("Failed extracting {}: {}", archive.display(), error);
                report.failed.push(ExtractFailure { archive, error });
            }
        }
    }
    Ok(report)
}

fn extract_one(
    archive: &Path,
    extractor: &dyn ArchiveExtractor,
    clock: &dyn Clock,
) -> Result<ExtractedPackage> {
    let name = package_name_from_file(archive).ok_or_else(|| Error::Archive {
        path: archive.to_path_buf(),
        message: "cannot derive a package name".to_string(),
    })?;
    let folder = archive.parent().unwrap_or(Path::new(".")).join(&name);

    info!("Extracting {} into {}", archive.display(), folder.display());
    extractor.extract_to(archive, &folder)?;

    let pattern = folder.join("ezcontentclass").join("class-*.xml");
    let definitions: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| entry.ok())
        .collect();
    if definitions.is_empty() {
        info!("Package {} contains no class definitions", name);
    }

    for path in &definitions {
        let mut document = ClassDocument::open(path)?;
        document.transform(clock)?;
        document.save()?;
        debug!("Normalized {}", path.display());
    }

    Ok(ExtractedPackage {
        archive: archive.to_path_buf(),
        folder,
        classes: definitions.len(),
    })
}
