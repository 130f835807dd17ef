//! Recovering JSON from free-form model output.
//!
//! Models wrap JSON in prose, markdown fences or reasoning blocks. Recovery
//! runs an ordered chain of strategies and stops at the first one that yields
//! a value. Callers choose the chain by the shape they expect.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::PipelineError;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").unwrap());

/// One way of pulling a JSON value out of model text.
pub trait RecoveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt(&self, text: &str) -> Option<Value>;
}

/// The whole (trimmed) text is JSON.
pub struct DirectParse;

impl RecoveryStrategy for DirectParse {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn attempt(&self, text: &str) -> Option<Value> {
        serde_json::from_str(text.trim()).ok()
    }
}

/// Contents of the first markdown code fence (```` ```json ```` or bare).
pub struct FencedBlock;

impl RecoveryStrategy for FencedBlock {
    fn name(&self) -> &'static str {
        "fenced_block"
    }

    fn attempt(&self, text: &str) -> Option<Value> {
        let captures = FENCED_BLOCK.captures(text)?;
        serde_json::from_str(captures.get(1)?.as_str().trim()).ok()
    }
}

/// First balanced `open ... close` span, skipping delimiters inside strings.
/// When the balanced span does not parse, retries from the first `open` to
/// the last `close`.
pub struct DelimitedSpan {
    open: char,
    close: char,
}

impl DelimitedSpan {
    pub fn object() -> Self {
        Self {
            open: '{',
            close: '}',
        }
    }

    pub fn array() -> Self {
        Self {
            open: '[',
            close: ']',
        }
    }
}

impl RecoveryStrategy for DelimitedSpan {
    fn name(&self) -> &'static str {
        if self.open == '[' {
            "array_span"
        } else {
            "object_span"
        }
    }

    fn attempt(&self, text: &str) -> Option<Value> {
        if let Some(span) = balanced_span(text, self.open, self.close) {
            if let Ok(value) = serde_json::from_str(span) {
                return Some(value);
            }
        }
        let start = text.find(self.open)?;
        let end = text.rfind(self.close)?;
        if start >= end {
            return None;
        }
        serde_json::from_str(&text[start..=end]).ok()
    }
}

/// First balanced span delimited by `open`/`close`, string- and escape-aware.
pub(crate) fn balanced_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove `<think>...</think>` blocks. An unclosed tag keeps whichever side
/// carries JSON.
pub fn strip_think_tags(text: &str) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find("<think>") {
        if let Some(end) = result[start..].find("</think>") {
            let end_pos = start + end + "</think>".len();
            result = format!("{}{}", &result[..start], &result[end_pos..]);
        } else {
            let after = result[start + "<think>".len()..].to_string();
            let before = result[..start].to_string();
            result = if after.contains('{') || after.contains('[') {
                after
            } else {
                before
            };
            break;
        }
    }
    result.trim().to_string()
}

/// Ordered strategy chain.
pub struct JsonRecovery {
    strategies: Vec<Box<dyn RecoveryStrategy>>,
}

impl JsonRecovery {
    pub fn new(strategies: Vec<Box<dyn RecoveryStrategy>>) -> Self {
        Self { strategies }
    }

    /// Chain for callers expecting an object.
    pub fn for_object() -> Self {
        Self::new(vec![
            Box::new(DirectParse),
            Box::new(FencedBlock),
            Box::new(DelimitedSpan::object()),
        ])
    }

    /// Chain for callers expecting an array (objects still accepted).
    pub fn for_array() -> Self {
        Self::new(vec![
            Box::new(DirectParse),
            Box::new(FencedBlock),
            Box::new(DelimitedSpan::array()),
            Box::new(DelimitedSpan::object()),
        ])
    }

    /// First value any strategy produces, or `MalformedModelOutput`.
    ///
    /// Text that already parses is returned as is, so literal `<think>` inside
    /// JSON strings survives. Everything else runs through the chain with
    /// reasoning blocks removed.
    pub fn recover(&self, raw: &str) -> Result<Value, PipelineError> {
        if let Some(value) = DirectParse.attempt(raw) {
            return Ok(value);
        }
        let cleaned = strip_think_tags(raw);
        for strategy in &self.strategies {
            if let Some(value) = strategy.attempt(&cleaned) {
                tracing::debug!(strategy = strategy.name(), "Recovered JSON from model output");
                return Ok(value);
            }
        }
        Err(PipelineError::MalformedModelOutput(preview(raw)))
    }
}

fn preview(raw: &str) -> String {
    const MAX: usize = 200;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "empty response".into();
    }
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
