//! PII masking for result rows.
//!
//! Two independent heuristics decide whether a text value is sensitive:
//!
//! - **Name signal**: the column name mentions an email, phone, mobile,
//!   contact number, SSN or social security field.
//! - **Shape signal**: the value contains something that looks like an email
//!   address, a phone number (seven or more digit/punctuation characters) or
//!   an SSN (`ddd-dd-dddd`) anywhere in it.
//!
//! When either fires exactly one masker runs, picked by priority against the
//! whole value:
//!
//! | Priority | Whole value is | Output |
//! |----------|----------------|--------|
//! | 1 | an SSN | `***-**-6789` |
//! | 2 | an email | `j***e@*******.com` |
//! | 3 | a phone number | `***-***-**67` |
//! | 4 | anything else | every letter and digit replaced by `*` |
//!
//! Free text carrying PII (`call 555-123-4567 tomorrow`) therefore gets the
//! fallback masker.
//!
//! The heuristics over-mask on purpose: any long enough numeric string is
//! treated as a phone number.
//!
//! Masking is a pure function of `(column, value)`. Null, boolean and numeric
//! values always pass through; keys are never altered.

mod maskers;

use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;

use crate::row::{CellValue, ResultRow};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9(][0-9\s().\-]{5,}[0-9]$").expect("valid regex"));

static SSN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}-[0-9]{2}-[0-9]{4}$").expect("valid regex"));

/// Unanchored forms of the shapes above, for PII embedded in longer text
static EMBEDDED_SHAPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"[0-9]{3}-[0-9]{2}-[0-9]{4}",
        r"|[^@\s]+@[^@\s]+\.[^@\s]+",
        r"|\+?[0-9(][0-9\s().\-]{5,}[0-9]"
    ))
    .expect("valid regex")
});

/// Masker selected for a sensitive value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaskKind {
    Ssn,
    Email,
    Phone,
    Fallback
}

impl MaskKind {
    fn apply(self, value: &str) -> String {
        match self {
            Self::Ssn => maskers::mask_ssn(value),
            Self::Email => maskers::mask_email(value),
            Self::Phone => maskers::mask_phone(value),
            Self::Fallback => maskers::mask_fallback(value)
        }
    }
}

/// Whether a column name alone marks its values as PII
pub fn column_signal(column: &str) -> bool {
    let name = column.to_lowercase();
    name.contains("email")
        || name.contains("phone")
        || name.contains("mobile")
        || (name.contains("contact") && name.contains("number"))
        || name.contains("ssn")
        || (name.contains("social") && name.contains("security"))
}

/// Whether an email, phone number or SSN occurs anywhere in the value
pub fn shape_signal(value: &str) -> bool {
    EMBEDDED_SHAPES.is_match(value)
}

/// Masker whose shape the whole value matches exactly, if any
pub fn value_shape(value: &str) -> Option<MaskKind> {
    if SSN_PATTERN.is_match(value) {
        Some(MaskKind::Ssn)
    } else if EMAIL_PATTERN.is_match(value) {
        Some(MaskKind::Email)
    } else if PHONE_PATTERN.is_match(value) {
        Some(MaskKind::Phone)
    } else {
        None
    }
}

/// Decide which masker applies to a text value, `None` when it is not PII
pub fn classify(column: &str, value: &str) -> Option<MaskKind> {
    if !shape_signal(value) && !column_signal(column) {
        return None;
    }
    Some(value_shape(value).unwrap_or(MaskKind::Fallback))
}

/// Mask a text value, returning it unchanged when no signal fires
pub fn mask_text(column: &str, value: &str) -> String {
    match classify(column, value) {
        Some(kind) => kind.apply(value),
        None => value.to_string()
    }
}

/// Mask a single cell; only text values are ever rewritten
pub fn mask_value(column: &str, value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(text) => CellValue::Text(mask_text(column, text)),
        other => other.clone()
    }
}

/// Masked copy of `row`, same keys in the same order
pub fn mask_row(row: &ResultRow) -> ResultRow {
    row.iter()
        .map(|(column, value)| (column.clone(), mask_value(column, value)))
        .collect()
}

/// Masked copy of a whole result set, row order preserved
pub fn mask_rows(rows: &[ResultRow]) -> Vec<ResultRow> {
    rows.par_iter().map(mask_row).collect()
}
