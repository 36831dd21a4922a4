//! Unit tests for export document serialization and validated import.

mod document_tests;
mod roundtrip_tests;

use crate::model::{FingerprintImage, ImageHandle, Package};
use crate::session::AnnotationStore;

/// A small annotated package resembling one month's collection.
fn sample_store() -> AnnotationStore {
    let images = vec![
        FingerprintImage::new(
            ImageHandle::new("12/act/5ededao.png", vec![0xFF]),
            chrono::NaiveDate::from_ymd_opt(2023, 5, 12),
            Some("act".to_string()),
            Some("5ededao".to_string()),
            None,
            Vec::new(),
        ),
        FingerprintImage::new(
            ImageHandle::new("12/bcf/indic_e.png", vec![0xFE]),
            None,
            Some("bcf".to_string()),
            Some("Indicador - Esquerda".to_string()),
            None,
            Vec::new(),
        ),
    ];
    AnnotationStore::new(Package::new("coleta_2023_05.zip", images))
}
