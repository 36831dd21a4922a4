//! The annotation store: validated mutation of the active package's
//! annotation lists.

use chrono::{Local, NaiveDateTime, Timelike};
use thiserror::Error;

use crate::model::catalog;
use crate::model::{Annotation, ErrorCode, ErrorDefinition, FingerprintImage, Package, Severity};

/// Rejections raised at the annotation boundary.
///
/// Nothing is stored when one of these is returned; the targeted image's
/// list is left exactly as it was.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// The code is not one of the nine catalog entries.
    #[error("unknown error code '{code}'")]
    UnknownErrorCode {
        /// The rejected code.
        code: String,
    },

    /// The severity is outside the accepted range.
    #[error("severity {value} is outside the accepted range 1..=5")]
    InvalidSeverity {
        /// The rejected value.
        value: u8,
    },

    /// The image index does not exist in the active package.
    #[error("no image at index {index} in package '{package}'")]
    UnknownImage {
        /// The rejected index.
        index: usize,
        /// Name of the active package.
        package: String,
    },
}

/// Owns the active package and guards every annotation mutation.
///
/// All invariants are enforced here, at assignment time: codes must resolve
/// in the catalog, severities must be in range, and each image keeps at most
/// one annotation per error. Serialization therefore cannot fail on any
/// reachable in-memory state. Mutations are confined to the targeted image's
/// list; the only cross-image state is the dirty flag, which every mutating
/// call sets and an export clears.
#[derive(Debug)]
pub struct AnnotationStore {
    package: Package,
    dirty: bool,
}

impl AnnotationStore {
    /// Wrap a freshly loaded package.
    pub fn new(package: Package) -> Self {
        Self {
            package,
            dirty: false,
        }
    }

    /// The package under annotation.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Give the package back, e.g. when the session is replaced.
    pub fn into_package(self) -> Package {
        self.package
    }

    /// Insert or update the annotation for (`index`, `code`), stamping the
    /// current local time.
    ///
    /// Fails without touching any state when the code is not in the catalog,
    /// the severity is out of range, or the index names no image.
    pub fn assign(
        &mut self,
        index: usize,
        code: &str,
        severity: u8,
    ) -> Result<&Annotation, AnnotateError> {
        let definition =
            catalog::lookup(code).ok_or_else(|| AnnotateError::UnknownErrorCode {
                code: code.to_string(),
            })?;
        let severity =
            Severity::new(severity).ok_or(AnnotateError::InvalidSeverity { value: severity })?;
        let index = self.checked_index(index)?;

        self.dirty = true;
        let annotation = self.package.images_mut()[index]
            .annotations_mut()
            .assign(definition, severity, assignment_time());
        log::debug!(
            "assigned {} ({}) to image {}",
            annotation.definition.code,
            annotation.severity,
            index
        );
        Ok(annotation)
    }

    /// Remove the annotation for (`index`, `code`).
    ///
    /// Returns whether one was present; removing an absent (or unparseable)
    /// code is a no-op, not an error.
    pub fn remove(&mut self, index: usize, code: &str) -> Result<bool, AnnotateError> {
        let index = self.checked_index(index)?;
        let Some(code) = ErrorCode::parse(code) else {
            return Ok(false);
        };

        let removed = self.package.images_mut()[index].annotations_mut().remove(code);
        if removed {
            self.dirty = true;
            log::debug!("removed {code} from image {index}");
        }
        Ok(removed)
    }

    /// Iterate an image's annotations in editing order. The iterator borrows
    /// the store and can be restarted without side effects.
    pub fn annotations(
        &self,
        index: usize,
    ) -> Result<std::slice::Iter<'_, Annotation>, AnnotateError> {
        Ok(self.image(index)?.annotations().iter())
    }

    /// Whether the image has at least one annotation. An image with zero
    /// errors is unannotated; "no defect" is an explicit E09 assignment.
    pub fn is_fully_annotated(&self, index: usize) -> Result<bool, AnnotateError> {
        Ok(self.image(index)?.is_fully_annotated())
    }

    /// The image at `index`, with an index-carrying error when out of range.
    pub fn image(&self, index: usize) -> Result<&FingerprintImage, AnnotateError> {
        self.package
            .image(index)
            .ok_or_else(|| AnnotateError::UnknownImage {
                index,
                package: self.package.name().to_string(),
            })
    }

    /// Number of images with at least one annotation.
    pub fn annotated_count(&self) -> usize {
        self.package
            .images()
            .iter()
            .filter(|image| image.is_fully_annotated())
            .count()
    }

    /// Index of the first unannotated image at or after `from`.
    pub fn next_unannotated(&self, from: usize) -> Option<usize> {
        (from..self.package.len()).find(|&index| {
            !self.package.images()[index].is_fully_annotated()
        })
    }

    /// Whether the session changed since the last export.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after a successful export.
    pub fn mark_exported(&mut self) {
        self.dirty = false;
    }

    /// Re-apply a previously recorded annotation, keeping its original
    /// assignment time. Used when reconciling an exported document with a
    /// freshly loaded package.
    pub(crate) fn restore(
        &mut self,
        index: usize,
        definition: &'static ErrorDefinition,
        severity: Severity,
        timestamp: NaiveDateTime,
    ) -> Result<(), AnnotateError> {
        let index = self.checked_index(index)?;
        self.dirty = true;
        self.package.images_mut()[index]
            .annotations_mut()
            .assign(definition, severity, timestamp);
        Ok(())
    }

    /// Bounds-check an image index so every mutation path reports the same
    /// locator-carrying error.
    fn checked_index(&self, index: usize) -> Result<usize, AnnotateError> {
        if index < self.package.len() {
            Ok(index)
        } else {
            Err(AnnotateError::UnknownImage {
                index,
                package: self.package.name().to_string(),
            })
        }
    }
}

/// Current local time at second granularity, matching the precision of the
/// export document's timestamp format.
fn assignment_time() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageHandle, MetadataIssue};

    fn test_package() -> Package {
        let images = vec![
            FingerprintImage::new(
                ImageHandle::new("12/act/dedao_d.png", vec![1]),
                chrono::NaiveDate::from_ymd_opt(2023, 5, 12),
                Some("act".to_string()),
                Some("Dedão - Direita".to_string()),
                None,
                Vec::new(),
            ),
            FingerprintImage::new(
                ImageHandle::new("solta.png", vec![2]),
                None,
                None,
                None,
                None,
                vec![MetadataIssue::MissingSubject],
            ),
        ];
        Package::new("coleta_2023_05.zip", images)
    }

    #[test]
    fn reassigning_keeps_one_entry_with_latest_severity() {
        let mut store = AnnotationStore::new(test_package());

        store.assign(0, "E06", 3).unwrap();
        store.assign(0, "E06", 2).unwrap();

        let entries: Vec<_> = store.annotations(0).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code(), ErrorCode::E06);
        assert_eq!(entries[0].severity.get(), 2);
    }

    #[test]
    fn out_of_range_severity_is_rejected_without_side_effects() {
        let mut store = AnnotationStore::new(test_package());
        store.assign(0, "E01", 4).unwrap();

        for value in [0, 6, 200] {
            let result = store.assign(0, "E02", value);
            assert!(matches!(
                result,
                Err(AnnotateError::InvalidSeverity { value: v }) if v == value
            ));
        }
        assert_eq!(store.annotations(0).unwrap().count(), 1);
    }

    #[test]
    fn unknown_code_is_rejected_without_side_effects() {
        let mut store = AnnotationStore::new(test_package());

        let result = store.assign(0, "E10", 3);
        assert!(matches!(
            result,
            Err(AnnotateError::UnknownErrorCode { ref code }) if code == "E10"
        ));
        assert_eq!(store.annotations(0).unwrap().count(), 0);
        assert!(!store.is_dirty());
    }

    #[test]
    fn removing_an_absent_code_is_a_noop() {
        let mut store = AnnotationStore::new(test_package());

        assert!(!store.remove(0, "E05").unwrap());
        assert!(!store.remove(0, "E99").unwrap());
        assert!(!store.is_dirty());

        store.assign(0, "E05", 1).unwrap();
        assert!(store.remove(0, "E05").unwrap());
    }

    #[test]
    fn unknown_image_index_carries_a_locator() {
        let mut store = AnnotationStore::new(test_package());
        let result = store.assign(9, "E01", 1);
        assert!(matches!(
            result,
            Err(AnnotateError::UnknownImage { index: 9, .. })
        ));
    }

    #[test]
    fn dirty_flag_follows_mutations_and_exports() {
        let mut store = AnnotationStore::new(test_package());
        assert!(!store.is_dirty());

        store.assign(0, "E09", 5).unwrap();
        assert!(store.is_dirty());

        store.mark_exported();
        assert!(!store.is_dirty());

        store.remove(0, "E09").unwrap();
        assert!(store.is_dirty());
    }

    #[test]
    fn annotation_progress_is_tracked_per_image() {
        let mut store = AnnotationStore::new(test_package());
        assert_eq!(store.annotated_count(), 0);
        assert_eq!(store.next_unannotated(0), Some(0));

        store.assign(0, "E09", 5).unwrap();
        assert_eq!(store.annotated_count(), 1);
        assert!(store.is_fully_annotated(0).unwrap());
        assert!(!store.is_fully_annotated(1).unwrap());
        assert_eq!(store.next_unannotated(0), Some(1));

        store.assign(1, "E03", 2).unwrap();
        assert_eq!(store.next_unannotated(0), None);
    }
}
