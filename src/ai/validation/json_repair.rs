//! Lenient JSON decoding for model replies
//!
//! Models asked for "only valid JSON" still wrap it in code fences, surround
//! it with prose, leave trailing commas or stop mid-object. `JsonRepairer`
//! applies a fixed ladder of repairs, re-parsing after each rung, and reports
//! which rungs were needed.

use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{ErrorCategory, LlmError, Result, ScoreError, preview};

/// One repair step, in the order they are attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    StripFences,
    ExtractEmbedded,
    DropTrailingCommas,
    CloseOpenDelimiters,
}

/// Parsed value plus the repairs that produced it
#[derive(Debug, Clone)]
pub struct Repaired {
    pub value: Value,
    pub applied: Vec<Repair>,
}

impl Repaired {
    pub fn was_repaired(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Parse a model reply into JSON, repairing common formatting damage
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    JsonRepairer::new().repair(content).map(|r| r.value)
}

/// Parse a model reply that must be a JSON object
pub fn decode_object(content: &str) -> Result<Map<String, Value>> {
    match extract_json_from_response(content)? {
        Value::Object(map) => Ok(map),
        other => Err(parse_error(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

#[derive(Debug, Default)]
pub struct JsonRepairer;

impl JsonRepairer {
    pub fn new() -> Self {
        Self
    }

    pub fn repair(&self, raw: &str) -> Result<Repaired> {
        let mut applied = Vec::new();
        let mut text = raw.trim().trim_start_matches('\u{feff}').trim().to_string();

        if let Some(inner) = strip_fences(&text) {
            text = inner;
            applied.push(Repair::StripFences);
        }
        if let Some(value) = try_parse(&text) {
            return Ok(Repaired { value, applied });
        }

        if let Some(embedded) = extract_embedded(&text)
            && embedded != text
        {
            text = embedded;
            applied.push(Repair::ExtractEmbedded);
            if let Some(value) = try_parse(&text) {
                return Ok(self.finish(value, applied));
            }
        }

        let without_commas = drop_trailing_commas(&text);
        if without_commas != text {
            text = without_commas;
            applied.push(Repair::DropTrailingCommas);
            if let Some(value) = try_parse(&text) {
                return Ok(self.finish(value, applied));
            }
        }

        let closed = close_open_delimiters(&text);
        if closed != text {
            applied.push(Repair::CloseOpenDelimiters);
            if let Some(value) = try_parse(&closed) {
                return Ok(self.finish(value, applied));
            }
        }

        Err(parse_error(format!(
            "unparseable JSON after {:?}: {}",
            applied,
            preview(raw.trim(), 200)
        )))
    }

    fn finish(&self, value: Value, applied: Vec<Repair>) -> Repaired {
        debug!("JSON repaired with {:?}", applied);
        Repaired { value, applied }
    }
}

// =============================================================================
// Repair steps
// =============================================================================

fn try_parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Body of the first fenced block, when the text contains one
fn strip_fences(text: &str) -> Option<String> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    // Skip the info string (`json`, `JSON`, ...) up to the end of the fence line
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(after_open.len());
    let body = &after_open[body_start..];
    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    Some(body.trim().to_string())
}

/// Structural characters outside string literals, with their byte offsets
struct Scan {
    structural: Vec<(usize, char)>,
    open_string: bool,
}

fn scan(text: &str) -> Scan {
    let mut structural = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '}' | '[' | ']' | ',' | ':' => structural.push((idx, ch)),
            _ => {}
        }
    }

    Scan {
        structural,
        open_string: in_string,
    }
}

/// Balanced object or array embedded in prose. Every opening delimiter is
/// tried in order and the first candidate that parses wins, so bracketed
/// prose ahead of the payload is skipped. When none parses, the candidate at
/// the first `{` (or `[`) goes on to the later steps.
fn extract_embedded(text: &str) -> Option<String> {
    let fallback = text.find('{').or_else(|| text.find('['))?;

    text.match_indices(['{', '['])
        .map(|(start, _)| balanced_from(&text[start..]))
        .find(|candidate| try_parse(candidate).is_some())
        .or_else(|| Some(balanced_from(&text[fallback..])))
}

/// Prefix of `candidate` up to the delimiter closing its first one.
/// An unterminated candidate is returned whole.
fn balanced_from(candidate: &str) -> String {
    let mut depth = 0usize;
    for (idx, ch) in scan(candidate).structural {
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return candidate[..idx + 1].to_string();
                }
            }
            _ => {}
        }
    }
    candidate.to_string()
}

fn drop_trailing_commas(text: &str) -> String {
    let dangling: Vec<usize> = scan(text)
        .structural
        .into_iter()
        .filter(|(idx, ch)| {
            *ch == ','
                && text[idx + 1..]
                    .trim_start()
                    .starts_with(['}', ']'])
        })
        .map(|(idx, _)| idx)
        .collect();

    if dangling.is_empty() {
        return text.to_string();
    }

    text.char_indices()
        .filter(|(idx, _)| !dangling.contains(idx))
        .map(|(_, ch)| ch)
        .collect()
}

/// Close a reply that stopped mid-structure
fn close_open_delimiters(text: &str) -> String {
    let scanned = scan(text);
    let mut stack = Vec::new();
    for (_, ch) in &scanned.structural {
        match ch {
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(ch) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut out = text.to_string();
    if scanned.open_string {
        out.push('"');
    }
    if stack.is_empty() {
        return out;
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    if out.ends_with(',') {
        out.pop();
    } else if out.ends_with(':') {
        out.push_str(" null");
    }
    out.extend(stack.iter().rev());
    out
}

fn parse_error(message: String) -> ScoreError {
    ScoreError::Llm(LlmError::new(ErrorCategory::ParseError, message))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
