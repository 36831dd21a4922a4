//! Package loading from collection archives.
//!
//! The loader walks a pre-opened archive, keeps the entries with a
//! recognizable image extension, reads each one into an opaque handle, and
//! derives per-image metadata from the naming convention. Archive decoding
//! itself is delegated to the `zip` crate; the loader never parses archive
//! structure. Loading builds a whole new [`Package`] and touches no prior
//! session state: it either completes or fails with nothing to clean up.

pub mod metadata;

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use thiserror::Error;
use zip::ZipArchive;

use crate::model::{FingerprintImage, ImageHandle, MetadataIssue, Package};
use metadata::{package_year_month, parse_entry};

/// Recognized image extensions inside a package archive.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff",
];

/// Fatal loading failures.
///
/// Per-image metadata problems are not errors; the image is loaded with the
/// affected fields empty and a [`MetadataIssue`] flag instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The archive itself could not be read.
    #[error("cannot read package archive '{archive}': {source}")]
    PackageFormat {
        /// Name of the offending archive.
        archive: String,
        /// Underlying archive decoding error.
        #[source]
        source: zip::result::ZipError,
    },

    /// One entry's bytes could not be read out of the archive.
    #[error("cannot read entry '{entry}' of package '{archive}': {source}")]
    EntryRead {
        /// Name of the archive.
        archive: String,
        /// Name of the offending entry.
        entry: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No entry had a recognizable image extension.
    #[error("package '{archive}' contains no recognizable images")]
    NoImages {
        /// Name of the offending archive.
        archive: String,
    },

    /// The archive file could not be opened.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether an archive entry is a loadable image.
///
/// Hidden files and macOS resource-fork metadata are skipped.
fn is_image_entry(name: &str) -> bool {
    let lower = name.to_lowercase();
    if lower.contains("__macosx") || lower.contains("/.") || lower.starts_with('.') {
        return false;
    }
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Load a package from a pre-opened archive handle.
///
/// Produces the ordered image catalog for one archive. Fails with a fatal
/// [`LoadError`] when the archive is unreadable or holds no recognizable
/// images; entries whose metadata cannot be derived are still loaded, with
/// the missing fields flagged per image.
pub fn load_package<R: Read + Seek>(reader: R, package_name: &str) -> Result<Package, LoadError> {
    let mut archive = ZipArchive::new(reader).map_err(|source| LoadError::PackageFormat {
        archive: package_name.to_string(),
        source,
    })?;

    let year_month = package_year_month(package_name);
    if year_month.is_none() {
        log::debug!("no year/month group in package name '{package_name}'");
    }

    log::debug!(
        "package '{}' contains {} entries",
        package_name,
        archive.len()
    );

    let mut images = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|source| LoadError::PackageFormat {
                archive: package_name.to_string(),
                source,
            })?;
        let name = entry.name().to_string();

        if entry.is_dir() {
            log::trace!("skipping directory entry '{name}'");
            continue;
        }
        if !is_image_entry(&name) {
            log::trace!("skipping non-image entry '{name}'");
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| LoadError::EntryRead {
                archive: package_name.to_string(),
                entry: name.clone(),
                source,
            })?;
        log::debug!("loaded entry '{}' ({} bytes)", name, bytes.len());

        let meta = parse_entry(year_month, &name);
        for issue in &meta.issues {
            log::warn!("entry '{name}': {issue}");
        }

        images.push(FingerprintImage::new(
            ImageHandle::new(name, bytes),
            meta.capture_date,
            meta.subject_id,
            meta.finger_id,
            meta.frame,
            meta.issues,
        ));
    }

    if images.is_empty() {
        return Err(LoadError::NoImages {
            archive: package_name.to_string(),
        });
    }

    images.sort_by(|a, b| {
        a.capture_date()
            .cmp(&b.capture_date())
            .then_with(|| a.subject_id().cmp(&b.subject_id()))
            .then_with(|| a.file_name().cmp(b.file_name()))
    });
    mark_duplicate_identities(&mut images);

    log::info!(
        "loaded {} images from package '{}'",
        images.len(),
        package_name
    );

    Ok(Package::new(package_name, images))
}

/// Load a package from an archive on disk.
pub fn load_package_from_path(path: &Path) -> Result<Package, LoadError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.zip");

    log::info!("opening package archive {path:?}");
    let file = std::fs::File::open(path)?;
    load_package(file, name)
}

/// Flag every image whose (subject, finger) pair is shared with another
/// image of the same package. The entry name stays the disambiguating key,
/// so both images are kept.
fn mark_duplicate_identities(images: &mut [FingerprintImage]) {
    let mut by_identity: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (index, image) in images.iter().enumerate() {
        if let (Some(subject), Some(finger)) = (image.subject_id(), image.finger_id()) {
            by_identity
                .entry((subject.to_string(), finger.to_string()))
                .or_default()
                .push(index);
        }
    }

    for indices in by_identity.values().filter(|group| group.len() > 1) {
        for &index in indices {
            let others: Vec<String> = indices
                .iter()
                .filter(|&&other| other != index)
                .map(|&other| images[other].file_name().to_string())
                .collect();
            log::warn!(
                "image '{}' shares subject/finger identity with {} other(s)",
                images[index].file_name(),
                others.len()
            );
            for other in others {
                images[index].flag(MetadataIssue::DuplicateIdentity { other });
            }
        }
    }
}
