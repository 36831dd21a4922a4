//! Error types for export document operations.

use thiserror::Error;

/// Errors raised while rendering, parsing, or validating an export document.
///
/// Structural problems (unreadable JSON, missing fields, wrong types) abort
/// an import outright. Content problems name the offending image and record,
/// so no failure is reported without a locator; strict imports abort on the
/// first one, lenient imports skip the record and keep it as a warning.
#[derive(Debug, Error)]
pub enum FormatError {
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error name that does not resolve in the catalog.
    #[error("image '{image}': unknown error name '{nome}'")]
    UnknownErrorName {
        /// File reference of the offending image record.
        image: String,
        /// The unresolvable name.
        nome: String,
    },

    /// A severity outside the accepted range.
    #[error("image '{image}', error '{nome}': severity {value} is outside the accepted range 1..=5")]
    InvalidSeverity {
        /// File reference of the offending image record.
        image: String,
        /// Error name of the offending record.
        nome: String,
        /// The rejected value.
        value: i64,
    },

    /// The same error name appears twice in one image's list.
    #[error("image '{image}': duplicate entry for error '{nome}'")]
    DuplicateErrorName {
        /// File reference of the offending image record.
        image: String,
        /// The duplicated name.
        nome: String,
    },

    /// An assignment timestamp that does not parse.
    #[error("image '{image}', error '{nome}': invalid timestamp '{value}'")]
    InvalidTimestamp {
        /// File reference of the offending image record.
        image: String,
        /// Error name of the offending record.
        nome: String,
        /// The rejected value.
        value: String,
    },

    /// A capture date that does not parse.
    #[error("image '{image}': invalid capture date '{value}'")]
    InvalidDate {
        /// File reference of the offending image record.
        image: String,
        /// The rejected value.
        value: String,
    },
}
