use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// How raw clipped text becomes a field value.
///
/// Handlers are total: they never fail, and return `None` only when the value
/// they look for is not there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Handler {
    /// Raw text unchanged.
    Identity,
    /// Newlines removed, NFKC-normalized. Single-value cells.
    StripNewlines,
    /// Line `index` of a multi-line cell, NFKC-normalized.
    IndexedSplit { index: usize },
    /// `"<code> - <description>"` from a cell split on `-`, else on a space.
    ReadingType,
    /// Characters reversed, newlines removed. Right-to-left runs rendered backwards.
    ReverseStrip,
}

impl Handler {
    pub fn apply(&self, raw: &str) -> Option<String> {
        match self {
            Handler::Identity => Some(raw.to_string()),
            Handler::StripNewlines => Some(normalize(&strip_newlines(raw))),
            Handler::IndexedSplit { index } => raw.split('\n').nth(*index).map(normalize),
            Handler::ReadingType => Some(reading_type(raw)),
            Handler::ReverseStrip => Some(strip_newlines(&raw.chars().rev().collect::<String>())),
        }
    }

    /// Short human-readable description, used when listing templates.
    pub fn describe(&self) -> String {
        match self {
            Handler::Identity => "raw text".to_string(),
            Handler::StripNewlines => "strip newlines".to_string(),
            Handler::IndexedSplit { index } => format!("line {}", index),
            Handler::ReadingType => "code - description".to_string(),
            Handler::ReverseStrip => "reversed, strip newlines".to_string(),
        }
    }
}

/// Unicode compatibility composition (NFKC). Folds Arabic presentation forms
/// and full-width digits into their plain equivalents.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect()
}

fn strip_newlines(text: &str) -> String {
    text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

fn reading_type(raw: &str) -> String {
    let text = strip_newlines(raw);
    match split_pair(&text, '-').or_else(|| split_pair(&text, ' ')) {
        Some((code, description)) => format!("{} - {}", code, normalize(description)),
        None => normalize(&text),
    }
}

/// First two pieces of `text` split on every `sep`; anything after the second
/// piece is dropped.
fn split_pair(text: &str, sep: char) -> Option<(&str, &str)> {
    let mut parts = text.split(sep);
    let first = parts.next()?;
    let second = parts.next()?;
    Some((first, second))
}
