//! Session lifecycle: the store guarding annotation mutations and the
//! controller sequencing load, annotation, and export.

mod controller;
mod store;

pub use controller::{ReconcileReport, Session, SessionError};
pub use store::{AnnotateError, AnnotationStore};
