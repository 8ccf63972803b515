//! Request validation.
//!
//! Checks that a parsed JSON body carries every field its [`JobVariant`]
//! needs, before any network, process or storage work is attempted.

use reqwest::Url;
use serde_json::Value;
use std::fmt;

use crate::job::{InputRole, JobVariant};

/// A request body that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Required fields that were absent, null, non-string or blank.
    pub missing: Vec<String>,
    /// Fields that were present but malformed.
    pub invalid: Vec<String>,
}

impl ValidationError {
    pub fn message(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("Missing required fields: {}", self.missing.join(", ")));
        }
        if !self.invalid.is_empty() {
            parts.push(format!("Invalid fields: {}", self.invalid.join(", ")));
        }
        parts.join("; ")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

/// A request that passed validation, with URLs already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub variant: JobVariant,
    /// Inputs in the variant's fetch order.
    pub inputs: Vec<(InputRole, Url)>,
    /// Pool category (five-target variant only).
    pub category: Option<String>,
}

/// Validates `body` against the fields `variant` requires.
///
/// Reports every missing and every invalid field at once.
pub fn validate(variant: JobVariant, body: &Value) -> Result<ValidatedRequest, ValidationError> {
    let mut missing = Vec::new();
    let mut invalid = Vec::new();
    let mut inputs = Vec::new();

    for (role, field) in variant.url_fields() {
        match non_empty_str(body, field) {
            None => missing.push(field.to_string()),
            Some(raw) => match parse_remote_url(raw) {
                Some(url) => inputs.push((*role, url)),
                None => invalid.push(field.to_string()),
            },
        }
    }

    let mut category = None;
    if let Some(field) = variant.category_field() {
        match non_empty_str(body, field) {
            None => missing.push(field.to_string()),
            Some(raw) if is_valid_category(raw) => category = Some(raw.to_string()),
            Some(_) => invalid.push(field.to_string()),
        }
    }

    if !missing.is_empty() || !invalid.is_empty() {
        return Err(ValidationError { missing, invalid });
    }

    Ok(ValidatedRequest {
        variant,
        inputs,
        category,
    })
}

fn non_empty_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_remote_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

/// A category names a single folder under the pool root.
fn is_valid_category(raw: &str) -> bool {
    raw != "."
        && raw != ".."
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
