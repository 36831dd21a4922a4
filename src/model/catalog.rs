//! The fixed catalog of standardized capture-error definitions.
//!
//! The catalog is process-wide, read-only state: nine definitions in a
//! stable E01..E09 order, shared by reference from every annotation.
//! Adding or changing error types is a catalog data change, not a session
//! operation, so there is no runtime registration API.

use std::fmt;

/// Code of one standardized capture error, `E01` through `E09`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    E01,
    E02,
    E03,
    E04,
    E05,
    E06,
    E07,
    E08,
    E09,
}

impl ErrorCode {
    /// Number of codes in the catalog.
    pub const COUNT: usize = 9;

    /// All codes in catalog order.
    pub const ALL: [ErrorCode; Self::COUNT] = [
        ErrorCode::E01,
        ErrorCode::E02,
        ErrorCode::E03,
        ErrorCode::E04,
        ErrorCode::E05,
        ErrorCode::E06,
        ErrorCode::E07,
        ErrorCode::E08,
        ErrorCode::E09,
    ];

    /// The textual form of this code (e.g. `"E06"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E01 => "E01",
            ErrorCode::E02 => "E02",
            ErrorCode::E03 => "E03",
            ErrorCode::E04 => "E04",
            ErrorCode::E05 => "E05",
            ErrorCode::E06 => "E06",
            ErrorCode::E07 => "E07",
            ErrorCode::E08 => "E08",
            ErrorCode::E09 => "E09",
        }
    }

    /// Parse a textual code. Returns `None` for anything outside `E01..=E09`.
    pub fn parse(code: &str) -> Option<ErrorCode> {
        ErrorCode::ALL
            .into_iter()
            .find(|c| c.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable catalog entry: code, display name, and description.
#[derive(Debug, PartialEq, Eq)]
pub struct ErrorDefinition {
    /// Unique code within the catalog.
    pub code: ErrorCode,
    /// Display name, as it appears in the export document.
    pub name: &'static str,
    /// One-line description of the capture defect.
    pub description: &'static str,
}

static CATALOG: [ErrorDefinition; ErrorCode::COUNT] = [
    ErrorDefinition {
        code: ErrorCode::E01,
        name: "Digital Escura",
        description: "Impressão digital muito escura, com regiões saturadas que ocultam o padrão de cristas.",
    },
    ErrorDefinition {
        code: ErrorCode::E02,
        name: "Manchas na Digital",
        description: "Manchas ou borrões sobre a área da digital, causados por umidade ou resíduos na pele.",
    },
    ErrorDefinition {
        code: ErrorCode::E03,
        name: "Fiapos na Digital",
        description: "Fiapos ou fibras sobrepostos à digital no momento da captura.",
    },
    ErrorDefinition {
        code: ErrorCode::E04,
        name: "Escâner Sujo",
        description: "Sujeira ou resíduo na superfície do escâner, visível na imagem capturada.",
    },
    ErrorDefinition {
        code: ErrorCode::E05,
        name: "Digital Clara",
        description: "Impressão digital muito clara, com baixo contraste entre cristas e vales.",
    },
    ErrorDefinition {
        code: ErrorCode::E06,
        name: "Dedo Fora da Área",
        description: "Parte do dedo posicionada fora da área útil de captura do escâner.",
    },
    ErrorDefinition {
        code: ErrorCode::E07,
        name: "Fora de Foco",
        description: "Imagem desfocada, sem nitidez suficiente para distinguir as cristas.",
    },
    ErrorDefinition {
        code: ErrorCode::E08,
        name: "Sem Padrão Visível",
        description: "Nenhum padrão de cristas identificável na imagem capturada.",
    },
    ErrorDefinition {
        code: ErrorCode::E09,
        name: "Segmentação Boa",
        description: "Segmentação correta, imagem sem defeitos de captura aparentes.",
    },
];

/// All nine definitions in E01..E09 order.
pub fn all() -> &'static [ErrorDefinition] {
    &CATALOG
}

/// The definition for a known code.
pub fn definition(code: ErrorCode) -> &'static ErrorDefinition {
    &CATALOG[code as usize]
}

/// Look up a definition by its textual code.
///
/// Returns `None` for codes outside the catalog; callers at the session and
/// import boundaries turn that into their own rejection error.
pub fn lookup(code: &str) -> Option<&'static ErrorDefinition> {
    ErrorCode::parse(code).map(definition)
}

/// Look up a definition by its display name (the `nome` field of the export
/// document).
pub fn by_name(name: &str) -> Option<&'static ErrorDefinition> {
    CATALOG.iter().find(|def| def.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_nine_entries_in_code_order() {
        let defs = all();
        assert_eq!(defs.len(), 9);
        for (def, code) in defs.iter().zip(ErrorCode::ALL) {
            assert_eq!(def.code, code);
        }
    }

    #[test]
    fn lookup_by_code() {
        let def = lookup("E06").unwrap();
        assert_eq!(def.name, "Dedo Fora da Área");
        assert!(std::ptr::eq(def, definition(ErrorCode::E06)));
    }

    #[test]
    fn lookup_rejects_unknown_codes() {
        assert!(lookup("E10").is_none());
        assert!(lookup("E00").is_none());
        assert!(lookup("e01").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn lookup_by_display_name() {
        let def = by_name("Segmentação Boa").unwrap();
        assert_eq!(def.code, ErrorCode::E09);
        assert!(by_name("Erro Inexistente").is_none());
    }

    #[test]
    fn codes_parse_and_display_roundtrip() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
            assert_eq!(code.to_string(), code.as_str());
        }
    }
}
