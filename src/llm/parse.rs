//! Lenient extraction of a JSON value from a free-text model reply, plus the
//! per-task shape validators.
//!
//! Models wrap their JSON in prose and markdown fences no matter how firmly
//! the prompt forbids it. The extractor scans for the single structurally
//! balanced JSON value in the reply and parses only that substring. Shape
//! problems (valid JSON, wrong structure) are reported as `SchemaMismatch`,
//! distinct from `MalformedResponse`, so callers can tell the two failure
//! modes apart.

use crate::letter::{FollowUpQuestion, LetterDraft, QualityReport};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// No parseable JSON value in the reply (none found, several found, or
    /// the candidate was not valid JSON).
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The reply parsed as JSON but does not have the expected shape.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// Strip markdown code fences from a response
fn strip_markdown_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let clean = if trimmed.starts_with("```json") {
        trimmed.strip_prefix("```json").unwrap_or(trimmed)
    } else if trimmed.starts_with("```") {
        trimmed.strip_prefix("```").unwrap_or(trimmed)
    } else {
        trimmed
    };
    let clean = if clean.ends_with("```") {
        clean.strip_suffix("```").unwrap_or(clean)
    } else {
        clean
    };
    clean.trim()
}

/// Find every top-level balanced JSON object or array in the text, skipping
/// brackets inside string literals. Stray closers outside a candidate are
/// ignored; a mismatched closer abandons the current candidate.
fn balanced_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::new();
    let mut stack: Vec<char> = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if start.is_some() && in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if start.is_some() => in_string = true,
            '{' | '[' => {
                if start.is_none() {
                    start = Some(i);
                }
                stack.push(c);
            }
            '}' | ']' => {
                let Some(open_at) = start else {
                    continue;
                };
                let matches = matches!(
                    (stack.pop(), c),
                    (Some('{'), '}') | (Some('['), ']')
                );
                if !matches {
                    stack.clear();
                    start = None;
                    continue;
                }
                if stack.is_empty() {
                    candidates.push(&text[open_at..i + c.len_utf8()]);
                    start = None;
                }
            }
            _ => {}
        }
    }

    candidates
}

/// Extract the single JSON value from a raw model reply.
///
/// Tolerates surrounding prose and markdown fencing. Fails with
/// [`ParseError::MalformedResponse`] when zero or more than one balanced
/// top-level value exists, or when the candidate is not valid JSON.
pub fn extract_json(raw: &str) -> Result<Value, ParseError> {
    let clean = strip_markdown_fences(raw);
    let candidates = balanced_candidates(clean);

    let candidate = match candidates.as_slice() {
        [] => {
            return Err(ParseError::MalformedResponse(
                "no JSON value found in response".to_string(),
            ))
        }
        [one] => *one,
        many => {
            return Err(ParseError::MalformedResponse(format!(
                "ambiguous response: {} top-level JSON values found",
                many.len()
            )))
        }
    };

    serde_json::from_str(candidate)
        .map_err(|e| ParseError::MalformedResponse(format!("invalid JSON: {}", e)))
}

/// Validate a follow-up reply: must be a JSON array of question objects.
pub fn follow_up_questions(value: Value) -> Result<Vec<FollowUpQuestion>, ParseError> {
    if !value.is_array() {
        return Err(ParseError::SchemaMismatch(
            "follow-up response is not an array".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| ParseError::SchemaMismatch(format!("follow-up question batch: {}", e)))
}

/// Validate a letter-draft reply: `{subject, body, nextSteps}`.
pub fn letter_draft(value: Value) -> Result<LetterDraft, ParseError> {
    if !value.is_object() {
        return Err(ParseError::SchemaMismatch(
            "letter draft is not an object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| ParseError::SchemaMismatch(format!("letter draft: {}", e)))
}

/// Validate a quality-check reply: `passesQualityCheck` must be a boolean.
pub fn quality_report(value: Value) -> Result<QualityReport, ParseError> {
    if !value
        .get("passesQualityCheck")
        .map(Value::is_boolean)
        .unwrap_or(false)
    {
        return Err(ParseError::SchemaMismatch(
            "quality report has no boolean passesQualityCheck".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| ParseError::SchemaMismatch(format!("quality report: {}", e)))
}
