//! Metadata derivation from package and entry naming conventions.
//!
//! Collection archives nest entries as `<day>/<subject>/<file>`, carry the
//! collection year and month in the archive name (`NNNN_NN` or `NNNN NN`),
//! and encode the finger in `_`-separated filename tokens. Nothing here
//! guesses: a field that cannot be derived is reported missing and the image
//! is flagged, rather than filled with a default.

use chrono::NaiveDate;

use crate::model::MetadataIssue;

/// Fields derived from one archive entry, plus the flags for everything that
/// could not be derived.
#[derive(Debug, Clone, Default)]
pub struct EntryMetadata {
    /// Capture date assembled from the package name and the day folder.
    pub capture_date: Option<NaiveDate>,
    /// Subject identifier from the parent folder.
    pub subject_id: Option<String>,
    /// Finger identifier from the filename convention.
    pub finger_id: Option<String>,
    /// Frame number within a capture sequence.
    pub frame: Option<u32>,
    /// Parse flags for the fields above.
    pub issues: Vec<MetadataIssue>,
}

/// Finger tokens and their display names.
const FINGER_NAMES: [(&str, &str); 5] = [
    ("dedao", "Dedão"),
    ("indic", "Indicador"),
    ("medio", "Médio"),
    ("anel", "Anelar"),
    ("mind", "Mindinho"),
];

/// Extract the collection year and month from a package name.
///
/// Scans for the first group of four digits, a space or underscore, and two
/// digits (e.g. `coleta_2023_05.zip`). Groups whose month falls outside
/// 1..=12 are skipped rather than accepted.
pub fn package_year_month(package_name: &str) -> Option<(i32, u32)> {
    let bytes = package_name.as_bytes();
    if bytes.len() < 7 {
        return None;
    }
    for i in 0..=bytes.len() - 7 {
        let group = &bytes[i..i + 7];
        let shape_matches = group[..4].iter().all(u8::is_ascii_digit)
            && (group[4] == b' ' || group[4] == b'_')
            && group[5..].iter().all(u8::is_ascii_digit);
        if !shape_matches {
            continue;
        }
        // The group is pure ASCII, so slicing the str here is safe.
        let year: i32 = match package_name[i..i + 4].parse() {
            Ok(year) => year,
            Err(_) => continue,
        };
        let month: u32 = match package_name[i + 5..i + 7].parse() {
            Ok(month) => month,
            Err(_) => continue,
        };
        if (1..=12).contains(&month) {
            return Some((year, month));
        }
    }
    None
}

/// Derive the metadata of one archive entry.
///
/// `year_month` comes from [`package_year_month`] on the archive name and is
/// shared by every entry of the package.
pub fn parse_entry(year_month: Option<(i32, u32)>, entry_name: &str) -> EntryMetadata {
    let mut issues = Vec::new();

    let parts: Vec<&str> = entry_name.split('/').filter(|p| !p.is_empty()).collect();
    let file_name = parts.last().copied().unwrap_or(entry_name);

    let subject_id = if parts.len() >= 2 {
        Some(parts[parts.len() - 2].to_string())
    } else {
        issues.push(MetadataIssue::MissingSubject);
        None
    };

    let day = if parts.len() >= 3 {
        parse_day(parts[parts.len() - 3])
    } else {
        None
    };
    let capture_date = match (year_month, day) {
        (Some((year, month)), Some(day)) => match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => Some(date),
            None => {
                issues.push(MetadataIssue::MissingCaptureDate {
                    detail: format!("{day:02}/{month:02}/{year:04} is not a calendar date"),
                });
                None
            }
        },
        (None, _) => {
            issues.push(MetadataIssue::MissingCaptureDate {
                detail: "no year/month group in package name".to_string(),
            });
            None
        }
        (Some(_), None) => {
            issues.push(MetadataIssue::MissingCaptureDate {
                detail: "no day folder in entry path".to_string(),
            });
            None
        }
    };

    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    let finger_id = match finger_from_stem(stem) {
        Some(finger) => Some(finger),
        None => {
            issues.push(MetadataIssue::UnrecognizedFinger {
                stem: stem.to_string(),
            });
            None
        }
    };
    let frame = frame_from_stem(stem);

    EntryMetadata {
        capture_date,
        subject_id,
        finger_id,
        frame,
        issues,
    }
}

/// A day folder must be purely numeric and a plausible day of month.
fn parse_day(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = part.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

/// Resolve a filename stem to a finger identifier.
///
/// Tokens name the finger (`dedao`, `indic`, `medio`, `anel`, `mind`) and
/// the hand (`d`/`e`, possibly prefixed with a digit as in `3e`). A stem
/// with no finger token is unrecognized.
fn finger_from_stem(stem: &str) -> Option<String> {
    let lower = stem.to_lowercase();
    let mut finger = None;
    let mut side = None;

    for part in lower.split('_') {
        if let Some((_, name)) = FINGER_NAMES.iter().find(|(token, _)| *token == part) {
            finger = Some(*name);
        }
        match part {
            "d" => side = Some("Direita"),
            "e" => side = Some("Esquerda"),
            _ => {
                let bytes = part.as_bytes();
                if bytes.len() == 2 && bytes[0].is_ascii_digit() {
                    match bytes[1] {
                        b'd' => side = Some("Direita"),
                        b'e' => side = Some("Esquerda"),
                        _ => {}
                    }
                }
            }
        }
    }

    match (finger, side) {
        (Some(finger), Some(side)) => Some(format!("{finger} - {side}")),
        (Some(finger), None) => Some(finger.to_string()),
        (None, _) => None,
    }
}

/// Extract the frame number from a `frame_N` token pair, if present.
fn frame_from_stem(stem: &str) -> Option<u32> {
    let lower = stem.to_lowercase();
    let parts: Vec<&str> = lower.split('_').collect();
    for pair in parts.windows(2) {
        if pair[0] != "frame" {
            continue;
        }
        let digits: String = pair[1].chars().take_while(char::is_ascii_digit).collect();
        if !digits.is_empty() {
            return digits.parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_from_package_name() {
        assert_eq!(package_year_month("coleta_2023_05.zip"), Some((2023, 5)));
        assert_eq!(package_year_month("Coleta 2024 11.zip"), Some((2024, 11)));
        assert_eq!(package_year_month("semdata.zip"), None);
        // Month out of range is not a date group.
        assert_eq!(package_year_month("serie_2023_99.zip"), None);
    }

    #[test]
    fn nested_entry_parses_all_fields() {
        let meta = parse_entry(Some((2023, 5)), "12/act/dedao_d_frame_3.png");
        assert_eq!(
            meta.capture_date,
            NaiveDate::from_ymd_opt(2023, 5, 12)
        );
        assert_eq!(meta.subject_id.as_deref(), Some("act"));
        assert_eq!(meta.finger_id.as_deref(), Some("Dedão - Direita"));
        assert_eq!(meta.frame, Some(3));
        assert!(meta.issues.is_empty());
    }

    #[test]
    fn flat_entry_is_flagged_not_guessed() {
        let meta = parse_entry(Some((2023, 5)), "capture.png");
        assert!(meta.capture_date.is_none());
        assert!(meta.subject_id.is_none());
        assert!(meta.finger_id.is_none());
        assert_eq!(meta.issues.len(), 3);
    }

    #[test]
    fn impossible_dates_are_rejected() {
        let meta = parse_entry(Some((2023, 2)), "31/act/anel_3e.png");
        assert!(meta.capture_date.is_none());
        assert!(meta.issues.iter().any(|issue| matches!(
            issue,
            MetadataIssue::MissingCaptureDate { .. }
        )));
        // The rest of the entry still parses.
        assert_eq!(meta.finger_id.as_deref(), Some("Anelar - Esquerda"));
    }

    #[test]
    fn finger_without_side_keeps_finger_name() {
        let meta = parse_entry(None, "12/act/mind.png");
        assert_eq!(meta.finger_id.as_deref(), Some("Mindinho"));
    }

    #[test]
    fn unconventional_stem_yields_no_finger() {
        let meta = parse_entry(Some((2023, 5)), "12/act/5ededao.png");
        assert!(meta.finger_id.is_none());
        assert!(meta.issues.iter().any(|issue| matches!(
            issue,
            MetadataIssue::UnrecognizedFinger { stem } if stem == "5ededao"
        )));
    }
}
