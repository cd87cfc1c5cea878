//! # JSON Extraction
//!
//! Models are told to answer with bare JSON but do not always listen.
//!
//! ```text
//! 1. whole text parses            {"items": [...]}
//! 2. fenced block                 Here you go: ```json {...} ```
//! 3. first "{" to last "}"        Sure! {...} Let me know...
//! ```
//!
//! The first candidate that deserializes into a [`ParsedReceipt`] wins.

use std::sync::OnceLock;

use regex::Regex;
use tabsplit_core::receipt::ParsedReceipt;
use tracing::debug;

use crate::error::{ScanError, ScanResult};

static FENCED: OnceLock<Option<Regex>> = OnceLock::new();
static BRACES: OnceLock<Option<Regex>> = OnceLock::new();

fn fenced() -> Option<&'static Regex> {
    FENCED
        .get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").ok())
        .as_ref()
}

fn braces() -> Option<&'static Regex> {
    BRACES
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").ok())
        .as_ref()
}

/// Pulls a receipt out of free-form model output.
pub fn extract_json(text: &str) -> ScanResult<ParsedReceipt> {
    if let Ok(parsed) = serde_json::from_str(text.trim()) {
        return Ok(parsed);
    }

    let fenced_match = fenced()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1));
    if let Some(m) = fenced_match {
        match serde_json::from_str(m.as_str()) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => debug!(error = %e, "Fenced block is not a receipt"),
        }
    }

    if let Some(m) = braces().and_then(|re| re.find(text)) {
        match serde_json::from_str(m.as_str()) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => debug!(error = %e, "Brace span is not a receipt"),
        }
    }

    Err(ScanError::InvalidJson(preview(text)))
}

fn preview(text: &str) -> String {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
