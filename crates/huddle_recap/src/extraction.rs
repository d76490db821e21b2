//! Utilities for extracting JSON from research responses.
//!
//! Research models wrap JSON in markdown fences, surround it with prose, or
//! leave trailing commas behind. These helpers find the payload and make one
//! repair attempt before giving up.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static TRAILING_COMMA: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])"));

/// Extract the JSON payload from a response that may contain markdown or
/// extra text.
///
/// Tries a fenced ```` ```json ```` block first, then the largest balanced
/// `{ ... }` span.
///
/// # Examples
///
/// ```
/// use huddle_recap::extract_json;
///
/// let response = "Here you go:\n```json\n{\"player_evidence\": []}\n```\n";
/// assert_eq!(extract_json(response).as_deref(), Some("{\"player_evidence\": []}"));
///
/// let response = "noise {\"a\": 1} more {\"b\": {\"c\": 2}} end";
/// assert_eq!(extract_json(response).as_deref(), Some("{\"b\": {\"c\": 2}}"));
/// ```
pub fn extract_json(response: &str) -> Option<String> {
    if let Some(json) = extract_from_code_block(response) {
        return Some(json);
    }
    largest_balanced(response)
}

/// Extract content from a ```` ```json ```` or bare ```` ``` ```` fence.
fn extract_from_code_block(response: &str) -> Option<String> {
    let (start, marker_len) = match response.find("```json") {
        Some(start) => (start, "```json".len()),
        None => (response.find("```")?, 3),
    };
    let content_start = start + marker_len;
    // Skip anything else on the fence line
    let body_start = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);

    let content = match response[body_start..].find("```") {
        Some(end) => &response[body_start..body_start + end],
        // Unclosed fence: the response was probably truncated
        None => &response[body_start..],
    };
    let content = content.trim();
    content.starts_with('{').then(|| content.to_string())
}

/// Longest top-level `{ ... }` span with balanced braces outside strings.
fn largest_balanced(response: &str) -> Option<String> {
    let mut best: Option<&str> = None;
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' if depth > 0 => in_string = !in_string,
            '{' if !in_string => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if !in_string && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let span = &response[start..=i];
                    if best.is_none_or(|b| span.len() > b.len()) {
                        best = Some(span);
                    }
                }
            }
            _ => {}
        }
    }

    best.map(str::to_string)
}

/// Best-effort repair of almost-JSON.
///
/// Drops trailing commas before `}` or `]` and cuts the text to the span
/// from the first `{` to the last `}`.
///
/// ```
/// use huddle_recap::repair_json;
///
/// assert_eq!(repair_json("junk {\"a\": [1, 2,],} tail"), "{\"a\": [1, 2]}");
/// ```
pub fn repair_json(text: &str) -> String {
    let cleaned = match TRAILING_COMMA.as_ref() {
        Ok(re) => re.replace_all(text, "$1").into_owned(),
        Err(_) => text.to_string(),
    };
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => cleaned[start..=end].to_string(),
        _ => cleaned,
    }
}

/// Parse a research response into a JSON value, repairing once on failure.
///
/// # Errors
///
/// Returns the parser message from the repaired attempt when both fail.
pub fn parse_json_response(response: &str) -> Result<Value, String> {
    let candidate = extract_json(response).unwrap_or_else(|| response.trim().to_string());
    match serde_json::from_str::<Value>(&candidate) {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::debug!(error = %first, "Response is not valid JSON, attempting repair");
            serde_json::from_str::<Value>(&repair_json(&candidate)).map_err(|e| {
                let preview: String = candidate.chars().take(100).collect();
                tracing::error!(error = %e, json_preview = %preview, "JSON repair failed");
                format!("invalid JSON after repair: {}", e)
            })
        }
    }
}
