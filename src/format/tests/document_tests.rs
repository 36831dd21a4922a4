//! Tests for the canonical document shape.

use serde_json::Value;

use super::sample_store;
use crate::format::{document_from_package, to_json_pretty};

#[test]
fn assigned_error_exports_catalog_name_and_severity() {
    let mut store = sample_store();
    store.assign(0, "E06", 2).unwrap();

    let document = document_from_package(store.package());

    assert_eq!(document.pacote, "coleta_2023_05.zip");
    let image = &document.imagens[0];
    assert_eq!(image.arquivo, "12/act/5ededao.png");
    assert_eq!(image.id.as_deref(), Some("act"));
    assert_eq!(image.dedo.as_deref(), Some("5ededao"));

    let erro = &image.erros[0];
    assert_eq!(erro.nome, "Dedo Fora da Área");
    assert_eq!(erro.avaliacao, 2);
    assert!(!erro.timestamp.is_empty());
}

#[test]
fn document_uses_the_stable_field_names() {
    let mut store = sample_store();
    store.assign(0, "E01", 5).unwrap();

    let json = to_json_pretty(&document_from_package(store.package())).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    assert!(value.get("pacote").is_some());
    let image = &value["imagens"][0];
    for field in ["arquivo", "data", "id", "dedo", "erros"] {
        assert!(image.get(field).is_some(), "missing field '{field}'");
    }
    let erro = &image["erros"][0];
    for field in ["nome", "descricao", "avaliacao", "timestamp"] {
        assert!(erro.get(field).is_some(), "missing field '{field}'");
    }
}

#[test]
fn missing_capture_date_serializes_as_null() {
    let store = sample_store();
    let json = to_json_pretty(&document_from_package(store.package())).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["imagens"][0]["data"], Value::String("12/05/2023".into()));
    assert_eq!(value["imagens"][1]["data"], Value::Null);
}

#[test]
fn unannotated_images_export_an_empty_error_list() {
    let store = sample_store();
    let document = document_from_package(store.package());
    assert!(document.imagens.iter().all(|image| image.erros.is_empty()));
}

#[test]
fn equal_states_render_byte_identical_json() {
    let mut store = sample_store();
    store.assign(0, "E02", 3).unwrap();
    store.assign(1, "E09", 5).unwrap();

    let first = to_json_pretty(&document_from_package(store.package())).unwrap();
    let second = to_json_pretty(&document_from_package(store.package())).unwrap();
    assert_eq!(first, second);
}
