//! Row shape classification for the primary source.
//!
//! The source has no row-type column: a province row carries a row number,
//! a code and a name; regency and district rows carry a code and a name and
//! are told apart by the depth of the code. A two-cell row with a one- or
//! two-digit code is a province whose row number was lost; one whose code
//! has no digits at all is a header. A longer row whose second cell is not a
//! code is read by its first two cells.

use regex::Regex;
use std::sync::LazyLock;

use crate::text::repair_spaced_words;

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*\((.+)\)$").expect("twin name pattern is valid")
});
static SLASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*/\s*(.+)$").expect("twin name pattern is valid"));

/// A classified primary row. Codes and names are trimmed but not normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Province { code: String, name: String },
    Regency { code: String, name: String },
    District { code: String, name: String },
    Skip,
}

/// Trim every cell, repair spaced-out words, and drop the blank cells that
/// lead the row.
pub fn preprocess<S: AsRef<str>>(row: &[S]) -> Vec<String> {
    row.iter()
        .map(|cell| repair_spaced_words(cell.as_ref().trim()).into_owned())
        .skip_while(String::is_empty)
        .collect()
}

/// Number of digits in a code, ignoring the dots between segments.
pub fn code_digits(code: &str) -> usize {
    code.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Digits and dots only
fn is_code(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Classify a preprocessed row by its shape.
pub fn classify(cells: &[String]) -> RowKind {
    match cells {
        [] | [_] => RowKind::Skip,
        [_, code, name, ..] if is_code(code) => RowKind::Province {
            code: code.clone(),
            name: name.clone(),
        },
        [code, name, ..] => classify_pair(code, name),
    }
}

fn classify_pair(code: &str, name: &str) -> RowKind {
    let (code, name) = (code.to_string(), name.to_string());
    match code_digits(&code) {
        0 => RowKind::Skip,
        1 | 2 => RowKind::Province { code, name },
        4 => RowKind::Regency { code, name },
        _ => RowKind::District { code, name },
    }
}

/// Split "X (Y)" or "X/Y" into its two co-equal names.
pub fn split_twin_names(name: &str) -> Vec<String> {
    let caps = PARENTHESIZED
        .captures(name)
        .or_else(|| SLASHED.captures(name));

    let Some(caps) = caps else {
        return Vec::new();
    };

    let first = caps[1].trim().to_string();
    let second = caps[2].trim().to_string();
    if first.is_empty() || second.is_empty() || first == second {
        return Vec::new();
    }
    vec![first, second]
}
