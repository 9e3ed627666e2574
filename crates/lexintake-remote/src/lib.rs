//! Remote analyzer backed by an LLM completion endpoint.
//!
//! The request shape and response normalisation are always compiled so they
//! can be tested without a network stack. The HTTP client itself is behind
//! the `http` feature.

use std::collections::BTreeMap;

use lexintake_ai::AnalyzerError;
use lexintake_core::analysis::{AnalysisResult, CATEGORY_OTHER, DEPARTMENT_GENERAL, Level};
use serde::Serialize;
use serde_json::{Map, Value};

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{RemoteAnalyzer, backoff_delay};

/// Instruction sent ahead of every narrative.
pub const PROMPT: &str = "You are a legal intake classifier. Read the client narrative below and \
extract structured fields. Respond with strict JSON only, using these keys: \
category (string), urgency (Low|Medium|High), key_facts (object), dates (object), \
parties (object), suggested_actions (array of strings), checklists (object of string arrays), \
department (string, optional), confidence (number between 0 and 1, optional).";

/// Confidence used when the response has none or it is not a number.
pub const DEFAULT_CONFIDENCE: f32 = 0.7;

/// Longest upstream error body kept in [`AnalyzerError::Upstream`].
pub const MAX_ERROR_BODY_CHARS: usize = 200;

/// Body of a completion request.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub input: String,
    pub max_output_tokens: u32,
    pub format: &'static str,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(model: &'a str, text: &str, max_output_tokens: u32) -> Self {
        Self {
            model,
            input: build_prompt(text),
            max_output_tokens,
            format: "json",
        }
    }
}

/// Full model input for a narrative.
pub fn build_prompt(text: &str) -> String {
    format!("{PROMPT}\n\nText:\n{text}\n\nReturn JSON only.")
}

/// Truncate an upstream body for error reporting.
pub fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// Turn a raw completion response body into an [`AnalysisResult`].
///
/// Accepts the result object directly or wrapped once in `{"response": ...}`,
/// where the wrapped value may itself be a JSON string. Missing collections
/// become empty, an empty category becomes `other`, a missing department
/// becomes `General`, urgency is coerced to Low/Medium/High and confidence is
/// clamped to [0, 1].
pub fn normalize_response(body: &str) -> Result<AnalysisResult, AnalyzerError> {
    let data: Value = serde_json::from_str(body)?;
    normalize_value(data)
}

/// [`normalize_response`] for an already-parsed body.
pub fn normalize_value(data: Value) -> Result<AnalysisResult, AnalyzerError> {
    let data = unwrap_response(data)?;
    let Value::Object(obj) = data else {
        return Err(AnalyzerError::Malformed(format!(
            "expected a JSON object, got {}",
            type_name(&data)
        )));
    };

    let urgency = coerce_urgency(obj.get("urgency"));
    let priority = obj
        .get("priority")
        .and_then(Value::as_str)
        .and_then(|p| p.parse::<Level>().ok())
        .unwrap_or(urgency);

    Ok(AnalysisResult {
        category: non_empty_str(obj.get("category")).unwrap_or_else(|| CATEGORY_OTHER.to_string()),
        department: non_empty_str(obj.get("department"))
            .unwrap_or_else(|| DEPARTMENT_GENERAL.to_string()),
        priority,
        urgency,
        key_facts: string_map(obj.get("key_facts")),
        dates: date_list(obj.get("dates")),
        parties: party_map(obj.get("parties")),
        suggested_actions: string_list(obj.get("suggested_actions")),
        checklists: checklist_map(obj.get("checklists")),
        case_type_key: non_empty_str(obj.get("case_type_key")),
        confidence: Some(coerce_confidence(obj.get("confidence"))),
    })
}

fn unwrap_response(data: Value) -> Result<Value, AnalyzerError> {
    let Value::Object(mut obj) = data else {
        return Ok(data);
    };
    match obj.remove("response") {
        Some(Value::String(s)) => {
            let block = extract_json_block(&s).ok_or_else(|| {
                AnalyzerError::Malformed("wrapped response is not JSON".to_string())
            })?;
            serde_json::from_str(block)
                .map_err(|e| AnalyzerError::Malformed(format!("wrapped response is not JSON: {e}")))
        }
        Some(inner @ (Value::Object(_) | Value::Array(_))) => Ok(inner),
        Some(other) => {
            // Not a wrapper; keep the key.
            obj.insert("response".to_string(), other);
            Ok(Value::Object(obj))
        }
        None => Ok(Value::Object(obj)),
    }
}

/// Locate a JSON object in model output that may carry code fences or prose.
fn extract_json_block(text: &str) -> Option<&str> {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return Some(after[..end].trim());
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let block = after[..end].trim();
            if block.starts_with('{') {
                return Some(block);
            }
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&trimmed[start..=end]),
        _ => None,
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `High`, `Medium` (also `med`, `mid`) and `Low`; anything else present is
/// `Medium`. A missing key keeps the schema default of `Low`.
fn coerce_urgency(v: Option<&Value>) -> Level {
    let Some(v) = v else {
        return Level::Low;
    };
    match v.as_str().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("high") => Level::High,
        Some("medium" | "med" | "mid") => Level::Medium,
        Some("low") => Level::Low,
        _ => Level::Medium,
    }
}

fn coerce_confidence(v: Option<&Value>) -> f32 {
    let parsed = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0) as f32,
        _ => DEFAULT_CONFIDENCE,
    }
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Render a scalar or nested value as display text; `null` is `None`.
fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            Some(parts.join(", "))
        }
        Value::Object(_) => Some(v.to_string()),
    }
}

fn object(v: Option<&Value>) -> Option<&Map<String, Value>> {
    v.and_then(Value::as_object)
}

fn string_map(v: Option<&Value>) -> BTreeMap<String, Option<String>> {
    object(v)
        .map(|m| m.iter().map(|(k, v)| (k.clone(), scalar_text(v))).collect())
        .unwrap_or_default()
}

/// Parties as an object, or as a list of names / `{name, role}` objects.
fn party_map(v: Option<&Value>) -> BTreeMap<String, Option<String>> {
    match v {
        Some(Value::Object(_)) => string_map(v),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let fallback = format!("party_{}", i + 1);
                match item {
                    Value::Object(o) => {
                        let role = non_empty_str(o.get("role")).unwrap_or(fallback);
                        (role, o.get("name").and_then(scalar_text))
                    }
                    other => (fallback, scalar_text(other)),
                }
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Date mentions from a list, a single string, or an object of labelled
/// dates. Labels mentioning the incident or accident come first.
fn date_list(v: Option<&Value>) -> Vec<String> {
    let mut out: Vec<String> = match v {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) => vec![s.trim().to_string()],
        Some(Value::Object(m)) => {
            let mut labelled: Vec<(bool, String)> = m
                .iter()
                .filter_map(|(k, v)| {
                    let key = k.to_ascii_lowercase();
                    let primary = key.contains("incident") || key.contains("accident");
                    scalar_text(v).map(|s| (!primary, s))
                })
                .collect();
            labelled.sort_by_key(|(secondary, _)| *secondary);
            labelled.into_iter().map(|(_, s)| s).collect()
        }
        _ => Vec::new(),
    };
    out.retain(|s| !s.is_empty());
    out
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn checklist_map(v: Option<&Value>) -> BTreeMap<String, Vec<String>> {
    object(v)
        .map(|m| {
            m.iter()
                .map(|(k, v)| (k.clone(), string_list(Some(v))))
                .collect()
        })
        .unwrap_or_default()
}
