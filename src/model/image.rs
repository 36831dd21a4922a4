//! Image records, opaque representation bundles, and the package that owns
//! them.

use std::fmt;

use chrono::NaiveDate;

use crate::model::annotation::AnnotationSet;

/// Opaque reference to the representation bundle of one capture.
///
/// The bundle carries the four externally-produced visual representations of
/// the fingerprint in a single file; the engine never interprets the bytes,
/// it only hands them through to the presentation layer. Dropping the owning
/// [`Package`] releases the bytes, on every exit path.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    name: String,
    bytes: Vec<u8>,
}

impl ImageHandle {
    /// Wrap the raw bytes of an archive entry.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// A handle reconstructed from an exported document, carrying no bytes.
    pub fn detached(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Entry name inside the package archive. This is the image's file
    /// reference in the export document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw bundle bytes. Empty for detached handles.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether this handle was reconstructed without its bundle bytes.
    pub fn is_detached(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The four visual representations bundled behind one handle.
///
/// Presentation metadata only: the engine never splits or decodes the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Calibrated capture (alpha layer).
    Calibrated,
    /// Ridge segmentation (red layer).
    RidgeSegmentation,
    /// Valley segmentation (green layer).
    ValleySegmentation,
    /// Minutiae map (blue layer).
    MinutiaeMap,
}

impl Representation {
    /// All representations in layer order.
    pub const ALL: [Representation; 4] = [
        Representation::Calibrated,
        Representation::RidgeSegmentation,
        Representation::ValleySegmentation,
        Representation::MinutiaeMap,
    ];

    /// Display label for this layer.
    pub fn label(self) -> &'static str {
        match self {
            Representation::Calibrated => "Calibrado (Alpha)",
            Representation::RidgeSegmentation => "Segmentação Cristas (R)",
            Representation::ValleySegmentation => "Segmentação Vales (G)",
            Representation::MinutiaeMap => "Minúcias (B)",
        }
    }
}

/// Why a metadata field could not be derived during load.
///
/// These flags are the per-image, non-fatal outcome of metadata parsing: the
/// image is still loaded, the affected field stays empty, and the flag names
/// what was missing so the failure is never reported without a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataIssue {
    /// The capture date could not be assembled from the package name and
    /// entry path.
    MissingCaptureDate {
        /// Which part of the date was missing or out of range.
        detail: String,
    },
    /// The entry path carries no subject folder.
    MissingSubject,
    /// The filename stem matches no finger naming convention.
    UnrecognizedFinger {
        /// The stem that failed to parse.
        stem: String,
    },
    /// Another image in the package resolved to the same (subject, finger)
    /// pair; the entry name stays the disambiguating key.
    DuplicateIdentity {
        /// Entry name of the colliding image.
        other: String,
    },
}

impl fmt::Display for MetadataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataIssue::MissingCaptureDate { detail } => {
                write!(f, "capture date unavailable: {detail}")
            }
            MetadataIssue::MissingSubject => write!(f, "no subject folder in entry path"),
            MetadataIssue::UnrecognizedFinger { stem } => {
                write!(f, "filename '{stem}' matches no finger convention")
            }
            MetadataIssue::DuplicateIdentity { other } => {
                write!(f, "same subject and finger as '{other}'")
            }
        }
    }
}

/// One fingerprint capture with its metadata and annotation list.
#[derive(Debug, Clone)]
pub struct FingerprintImage {
    handle: ImageHandle,
    capture_date: Option<NaiveDate>,
    subject_id: Option<String>,
    finger_id: Option<String>,
    frame: Option<u32>,
    issues: Vec<MetadataIssue>,
    annotations: AnnotationSet,
}

impl FingerprintImage {
    /// Assemble an image record from its handle and derived metadata.
    pub fn new(
        handle: ImageHandle,
        capture_date: Option<NaiveDate>,
        subject_id: Option<String>,
        finger_id: Option<String>,
        frame: Option<u32>,
        issues: Vec<MetadataIssue>,
    ) -> Self {
        Self {
            handle,
            capture_date,
            subject_id,
            finger_id,
            frame,
            issues,
            annotations: AnnotationSet::new(),
        }
    }

    /// The opaque representation bundle.
    pub fn handle(&self) -> &ImageHandle {
        &self.handle
    }

    /// Entry name of the bundle, the image's file reference.
    pub fn file_name(&self) -> &str {
        self.handle.name()
    }

    /// Capture date, when it could be derived.
    pub fn capture_date(&self) -> Option<NaiveDate> {
        self.capture_date
    }

    /// Subject identifier, when it could be derived.
    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    /// Finger identifier, when it could be derived.
    pub fn finger_id(&self) -> Option<&str> {
        self.finger_id.as_deref()
    }

    /// Frame number within a capture sequence, when present in the filename.
    pub fn frame(&self) -> Option<u32> {
        self.frame
    }

    /// Metadata parse flags collected during load.
    pub fn issues(&self) -> &[MetadataIssue] {
        &self.issues
    }

    /// Whether any metadata field failed to parse.
    pub fn is_flagged(&self) -> bool {
        !self.issues.is_empty()
    }

    /// The image's annotation list, in editing order.
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// An image counts as annotated once at least one error is assigned;
    /// "no defect" is expressed by an explicit E09 annotation, not by an
    /// empty list.
    pub fn is_fully_annotated(&self) -> bool {
        !self.annotations.is_empty()
    }

    pub(crate) fn annotations_mut(&mut self) -> &mut AnnotationSet {
        &mut self.annotations
    }

    pub(crate) fn flag(&mut self, issue: MetadataIssue) {
        self.issues.push(issue);
    }
}

/// One imported archive of related fingerprint images.
///
/// The name is fixed at load time and the image list only changes by loading
/// a whole new package; there is no partial merge.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    images: Vec<FingerprintImage>,
}

impl Package {
    /// Create a package from an ordered image catalog.
    pub fn new(name: impl Into<String>, images: Vec<FingerprintImage>) -> Self {
        Self {
            name: name.into(),
            images,
        }
    }

    /// The archive name this package was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered image catalog.
    pub fn images(&self) -> &[FingerprintImage] {
        &self.images
    }

    /// The image at `index`, if in range.
    pub fn image(&self, index: usize) -> Option<&FingerprintImage> {
        self.images.get(index)
    }

    /// Number of images in the package.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the package holds no images. Loading rejects empty archives,
    /// so this is only reachable through direct construction.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub(crate) fn images_mut(&mut self) -> &mut [FingerprintImage] {
        &mut self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_handles_carry_no_bytes() {
        let handle = ImageHandle::detached("act/5ededao.png");
        assert!(handle.is_detached());
        assert_eq!(handle.name(), "act/5ededao.png");

        let loaded = ImageHandle::new("a.png", vec![1, 2, 3]);
        assert!(!loaded.is_detached());
    }

    #[test]
    fn representation_labels_are_stable() {
        assert_eq!(Representation::ALL.len(), 4);
        assert_eq!(Representation::Calibrated.label(), "Calibrado (Alpha)");
        assert_eq!(Representation::MinutiaeMap.label(), "Minúcias (B)");
    }

    #[test]
    fn flagged_images_report_their_issues() {
        let mut image = FingerprintImage::new(
            ImageHandle::detached("x.png"),
            None,
            None,
            None,
            None,
            vec![MetadataIssue::MissingSubject],
        );
        assert!(image.is_flagged());
        image.flag(MetadataIssue::UnrecognizedFinger {
            stem: "x".to_string(),
        });
        assert_eq!(image.issues().len(), 2);
    }
}
