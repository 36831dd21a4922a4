//! The canonical export document: serialization and validated re-import.
//!
//! Exporting converts the in-memory session into a schema-stable JSON
//! document; importing reconstructs session state from one, re-validating
//! every record against the catalog and the severity range so the document
//! boundary can never corrupt in-memory state.

mod document;
mod error;
mod json;

#[cfg(test)]
mod tests;

pub use document::{
    DATE_FORMAT, ErrorRecord, ImageRecord, SessionDocument, TIMESTAMP_FORMAT,
    document_from_package,
};
pub use error::FormatError;
pub use json::{ImportMode, ImportReport, from_json_str, package_from_document, to_json_pretty};

pub(crate) use json::validate_record;
