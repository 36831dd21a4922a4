//! Export document serialization and validated re-import.

use chrono::NaiveDateTime;

use crate::format::document::{
    ErrorRecord, SessionDocument, parse_date, parse_timestamp,
};
use crate::format::error::FormatError;
use crate::model::catalog;
use crate::model::{ErrorDefinition, FingerprintImage, ImageHandle, Package, Severity};

/// How the import reacts to content violations (unknown names, out-of-range
/// severities, unparseable dates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Abort the whole import on the first offending record; no partial
    /// state is produced.
    #[default]
    Strict,
    /// Skip offending records, keeping each one as a warning in the report.
    Lenient,
}

/// Outcome of an import: the reconstructed package plus the records that
/// were skipped.
#[derive(Debug)]
pub struct ImportReport {
    /// Reconstructed package. Its image handles are detached: the document
    /// carries no pixel data.
    pub package: Package,
    /// Content violations skipped in lenient mode. Always empty in strict
    /// mode, where the first violation aborts.
    pub warnings: Vec<FormatError>,
}

/// Serialize a document to pretty-printed JSON.
pub fn to_json_pretty(document: &SessionDocument) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Parse and validate a JSON export document.
pub fn from_json_str(json: &str, mode: ImportMode) -> Result<ImportReport, FormatError> {
    let document: SessionDocument = serde_json::from_str(json)?;
    package_from_document(&document, mode)
}

/// Rebuild session state from a parsed document.
///
/// Every error name is resolved against the catalog, every severity checked
/// against the accepted range, and per-image name uniqueness re-enforced, so
/// nothing invalid reaches the in-memory state.
pub fn package_from_document(
    document: &SessionDocument,
    mode: ImportMode,
) -> Result<ImportReport, FormatError> {
    let mut warnings = Vec::new();
    let mut images = Vec::with_capacity(document.imagens.len());

    for record in &document.imagens {
        let capture_date = match &record.data {
            None => None,
            Some(value) => match parse_date(value) {
                Some(date) => Some(date),
                None => {
                    let error = FormatError::InvalidDate {
                        image: record.arquivo.clone(),
                        value: value.clone(),
                    };
                    match mode {
                        ImportMode::Strict => return Err(error),
                        ImportMode::Lenient => {
                            log::warn!("import: {error}");
                            warnings.push(error);
                            None
                        }
                    }
                }
            },
        };

        let mut image = FingerprintImage::new(
            ImageHandle::detached(record.arquivo.as_str()),
            capture_date,
            record.id.clone(),
            record.dedo.clone(),
            None,
            Vec::new(),
        );

        for erro in &record.erros {
            let validated = validate_record(&record.arquivo, erro).and_then(
                |(definition, severity, timestamp)| {
                    if image.annotations().get(definition.code).is_some() {
                        Err(FormatError::DuplicateErrorName {
                            image: record.arquivo.clone(),
                            nome: erro.nome.clone(),
                        })
                    } else {
                        Ok((definition, severity, timestamp))
                    }
                },
            );
            match validated {
                Ok((definition, severity, timestamp)) => {
                    image.annotations_mut().assign(definition, severity, timestamp);
                }
                Err(error) => match mode {
                    ImportMode::Strict => return Err(error),
                    ImportMode::Lenient => {
                        log::warn!("import: {error}");
                        warnings.push(error);
                    }
                },
            }
        }

        images.push(image);
    }

    let package = Package::new(document.pacote.clone(), images);
    log::info!(
        "imported package '{}': {} images, {} skipped record(s)",
        package.name(),
        package.len(),
        warnings.len()
    );

    Ok(ImportReport { package, warnings })
}

/// Validate one error record's content against the catalog and formats.
///
/// Shared by document import and session reconciliation.
pub(crate) fn validate_record(
    image: &str,
    record: &ErrorRecord,
) -> Result<(&'static ErrorDefinition, Severity, NaiveDateTime), FormatError> {
    let definition =
        catalog::by_name(&record.nome).ok_or_else(|| FormatError::UnknownErrorName {
            image: image.to_string(),
            nome: record.nome.clone(),
        })?;

    let severity = u8::try_from(record.avaliacao)
        .ok()
        .and_then(Severity::new)
        .ok_or_else(|| FormatError::InvalidSeverity {
            image: image.to_string(),
            nome: record.nome.clone(),
            value: record.avaliacao,
        })?;

    let timestamp =
        parse_timestamp(&record.timestamp).ok_or_else(|| FormatError::InvalidTimestamp {
            image: image.to_string(),
            nome: record.nome.clone(),
            value: record.timestamp.clone(),
        })?;

    Ok((definition, severity, timestamp))
}
