//! The canonical export document.
//!
//! Field names follow the curation pipeline's Portuguese schema. The
//! document is the stable contract with downstream training tooling: field
//! order is declaration order, arrays keep insertion order, and equal
//! in-memory states render to byte-identical JSON.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::model::Package;

/// Date format of the `data` field.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Timestamp format of annotation `timestamp` fields.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Root of the canonical export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    /// Package name.
    pub pacote: String,
    /// Image entries in package order.
    pub imagens: Vec<ImageRecord>,
}

/// One image with its metadata and error list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// File reference of the image inside the package.
    pub arquivo: String,
    /// Capture date as `DD/MM/YYYY`; null (never an empty string) when the
    /// loader could not derive it. May be absent on input.
    #[serde(default)]
    pub data: Option<String>,
    /// Subject identifier, or null when it could not be derived.
    pub id: Option<String>,
    /// Finger identifier, or null when it could not be derived.
    pub dedo: Option<String>,
    /// Assigned errors in editing order; empty for an unannotated image.
    pub erros: Vec<ErrorRecord>,
}

/// One severity-rated error assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Catalog display name; unique within one image's list.
    pub nome: String,
    /// Catalog description.
    pub descricao: String,
    /// Severity, 1..=5.
    pub avaliacao: i64,
    /// Assignment time as `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

/// Build the export document for a package.
///
/// Cannot fail: the store already enforced every invariant at assignment
/// time, so any reachable in-memory state renders cleanly.
pub fn document_from_package(package: &Package) -> SessionDocument {
    SessionDocument {
        pacote: package.name().to_string(),
        imagens: package
            .images()
            .iter()
            .map(|image| ImageRecord {
                arquivo: image.file_name().to_string(),
                data: image.capture_date().map(format_date),
                id: image.subject_id().map(str::to_string),
                dedo: image.finger_id().map(str::to_string),
                erros: image
                    .annotations()
                    .iter()
                    .map(|annotation| ErrorRecord {
                        nome: annotation.definition.name.to_string(),
                        descricao: annotation.definition.description.to_string(),
                        avaliacao: i64::from(annotation.severity.get()),
                        timestamp: format_timestamp(annotation.timestamp),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Render a capture date for the `data` field.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `data` field value.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Render an assignment timestamp.
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a `timestamp` field value.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}
