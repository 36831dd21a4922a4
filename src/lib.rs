//! Annotation session and export engine for neonatal fingerprint quality
//! curation.
//!
//! The engine ingests a package archive of related fingerprint captures,
//! keeps a consistent multi-label annotation state across an interactive
//! session, and serializes it to a schema-stable JSON document for
//! downstream dataset tooling. Each capture carries its four visual
//! representations as one opaque handle; the graphical interface and the
//! image-processing routines that produce those representations live outside
//! this crate.
//!
//! The usual flow is a [`session::Session`]: load a package, select images,
//! assign severity-rated errors from the fixed nine-entry catalog, export.
//!
//! ```rust,ignore
//! use benapro_core::session::Session;
//!
//! let mut session = Session::new();
//! session.load_package_from_path(path)?;
//! session.annotate("E06", 2)?;
//! let json = session.export_session()?;
//! ```

pub mod format;
pub mod loader;
pub mod model;
pub mod session;

pub use format::{FormatError, ImportMode, ImportReport, SessionDocument};
pub use loader::{LoadError, load_package, load_package_from_path};
pub use model::{
    Annotation, AnnotationSet, ErrorCode, ErrorDefinition, FingerprintImage, ImageHandle,
    MetadataIssue, Package, Representation, Severity,
};
pub use session::{AnnotateError, AnnotationStore, ReconcileReport, Session, SessionError};
