//! Session lifecycle and the operations the surrounding interface invokes.

use std::io::{Read, Seek};
use std::path::Path;

use thiserror::Error;

use crate::format::{self, FormatError, ImportMode, SessionDocument};
use crate::loader::{self, LoadError};
use crate::model::{Annotation, FingerprintImage, Package};
use crate::session::store::{AnnotateError, AnnotationStore};

/// Failures of session-level operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An operation that needs a package ran before any load.
    #[error("no active package: load a package archive first")]
    NoActivePackage,

    /// Fatal package loading failure; the prior session is preserved.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Export document failure.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Annotation boundary rejection.
    #[error(transparent)]
    Annotate(#[from] AnnotateError),
}

/// Outcome of reconciling an exported document with the loaded package.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Annotations applied onto matching images.
    pub applied: usize,
    /// Records whose content failed validation and was skipped.
    pub skipped: Vec<FormatError>,
    /// File references of document records matching no loaded image.
    pub unmatched: Vec<String>,
}

/// The single active annotation session.
///
/// Owns at most one package/store pair; loading builds the replacement fully
/// and then swaps it in, so a failed load leaves the previous session
/// untouched and a successful one releases the old package's handles in one
/// step. The session is not reentrant: callers serialize operations, as the
/// surrounding interface disables its controls during loads.
#[derive(Debug, Default)]
pub struct Session {
    store: Option<AnnotationStore>,
    current: usize,
}

impl Session {
    /// Create a session with no package loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a package from a pre-opened archive handle, replacing any active
    /// package.
    pub fn load_package<R: Read + Seek>(
        &mut self,
        reader: R,
        package_name: &str,
    ) -> Result<&Package, SessionError> {
        let package = loader::load_package(reader, package_name)?;
        Ok(self.adopt(package))
    }

    /// Load a package from an archive on disk, replacing any active package.
    pub fn load_package_from_path(&mut self, path: &Path) -> Result<&Package, SessionError> {
        let package = loader::load_package_from_path(path)?;
        Ok(self.adopt(package))
    }

    /// The active package, if any.
    pub fn package(&self) -> Option<&Package> {
        self.store.as_ref().map(AnnotationStore::package)
    }

    /// The annotation store, for read access and index-addressed operations.
    pub fn store(&self) -> Option<&AnnotationStore> {
        self.store.as_ref()
    }

    /// Mutable store access for the interface layer.
    pub fn store_mut(&mut self) -> Option<&mut AnnotationStore> {
        self.store.as_mut()
    }

    /// Point the session at the image that annotate/unannotate will target.
    pub fn select_image(&mut self, index: usize) -> Result<(), SessionError> {
        let store = self.store.as_ref().ok_or(SessionError::NoActivePackage)?;
        store.image(index)?;
        self.current = index;
        Ok(())
    }

    /// Index of the selected image.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The selected image, if a package is loaded.
    pub fn current_image(&self) -> Option<&FingerprintImage> {
        self.store
            .as_ref()
            .and_then(|store| store.package().image(self.current))
    }

    /// Assign an error to the selected image.
    pub fn annotate(&mut self, code: &str, severity: u8) -> Result<&Annotation, SessionError> {
        let current = self.current;
        let store = self.store.as_mut().ok_or(SessionError::NoActivePackage)?;
        Ok(store.assign(current, code, severity)?)
    }

    /// Remove an error from the selected image. No-op when absent.
    pub fn unannotate(&mut self, code: &str) -> Result<bool, SessionError> {
        let current = self.current;
        let store = self.store.as_mut().ok_or(SessionError::NoActivePackage)?;
        Ok(store.remove(current, code)?)
    }

    /// Move the cursor to the next image without annotations, scanning past
    /// the current image first and wrapping to the start. Returns the new
    /// index, or `None` when every image is annotated.
    pub fn jump_to_next_unannotated(&mut self) -> Option<usize> {
        let store = self.store.as_ref()?;
        let next = store
            .next_unannotated(self.current + 1)
            .or_else(|| store.next_unannotated(0))?;
        self.current = next;
        Some(next)
    }

    /// Build the canonical export document and clear the dirty flag.
    ///
    /// Fails only when no package is loaded; a loaded session always
    /// serializes, because the store enforced every invariant up front.
    pub fn export_document(&mut self) -> Result<SessionDocument, SessionError> {
        let store = self.store.as_mut().ok_or(SessionError::NoActivePackage)?;
        let document = format::document_from_package(store.package());
        let annotations: usize = document.imagens.iter().map(|image| image.erros.len()).sum();
        log::info!(
            "exported package '{}': {} images, {} annotations",
            document.pacote,
            document.imagens.len(),
            annotations
        );
        store.mark_exported();
        Ok(document)
    }

    /// Serialize the session to canonical JSON and clear the dirty flag.
    pub fn export_session(&mut self) -> Result<String, SessionError> {
        let document = self.export_document()?;
        Ok(format::to_json_pretty(&document)?)
    }

    /// Replace the session with the state of an exported document, for
    /// continued editing. Returns the records skipped in lenient mode.
    pub fn import_session(
        &mut self,
        json: &str,
        mode: ImportMode,
    ) -> Result<Vec<FormatError>, SessionError> {
        let report = format::from_json_str(json, mode)?;
        self.adopt(report.package);
        Ok(report.warnings)
    }

    /// Apply a previously exported document onto the loaded package.
    ///
    /// Records are joined to images by file reference first, then by the
    /// (subject, finger) pair; restored annotations keep their recorded
    /// timestamps. Unmatched and invalid records are reported, never
    /// silently dropped. Afterwards the cursor moves to the first image
    /// still missing annotations, ready to resume work.
    pub fn reconcile(&mut self, document: &SessionDocument) -> Result<ReconcileReport, SessionError> {
        let store = self.store.as_mut().ok_or(SessionError::NoActivePackage)?;
        let mut report = ReconcileReport::default();

        for record in &document.imagens {
            let Some(index) = find_image(store.package(), record) else {
                log::warn!("reconcile: no image matches record '{}'", record.arquivo);
                report.unmatched.push(record.arquivo.clone());
                continue;
            };

            for erro in &record.erros {
                match format::validate_record(&record.arquivo, erro) {
                    Ok((definition, severity, timestamp)) => {
                        store.restore(index, definition, severity, timestamp)?;
                        report.applied += 1;
                    }
                    Err(error) => {
                        log::warn!("reconcile: {error}");
                        report.skipped.push(error);
                    }
                }
            }
        }

        if let Some(next) = store.next_unannotated(0) {
            self.current = next;
        }

        log::info!(
            "reconciled {} annotation(s), {} skipped, {} unmatched record(s)",
            report.applied,
            report.skipped.len(),
            report.unmatched.len()
        );
        Ok(report)
    }

    /// Whether the session changed since the last export.
    pub fn is_dirty(&self) -> bool {
        self.store.as_ref().is_some_and(AnnotationStore::is_dirty)
    }

    /// Drop the active package, releasing its image handles.
    pub fn close(&mut self) {
        if self.store.take().is_some() {
            log::info!("session closed, package released");
        }
        self.current = 0;
    }

    fn adopt(&mut self, package: Package) -> &Package {
        log::info!(
            "session now holds package '{}' ({} images)",
            package.name(),
            package.len()
        );
        self.store = Some(AnnotationStore::new(package));
        self.current = 0;
        self.store
            .as_ref()
            .map(AnnotationStore::package)
            .expect("store was just set")
    }
}

/// Match a document record to a loaded image: the file reference is
/// authoritative, the (subject, finger) pair is the fallback.
fn find_image(package: &Package, record: &format::ImageRecord) -> Option<usize> {
    if let Some(index) = package
        .images()
        .iter()
        .position(|image| image.file_name() == record.arquivo)
    {
        return Some(index);
    }
    match (&record.id, &record.dedo) {
        (Some(id), Some(dedo)) => package.images().iter().position(|image| {
            image.subject_id() == Some(id.as_str()) && image.finger_id() == Some(dedo.as_str())
        }),
        _ => None,
    }
}
