//! Shape validation for the JSON tiers.

use bugscope_core::{AnalysisResult, FieldAliases};
use serde_json::{Map, Value};

use crate::tier::TierMiss;

/// Map a parsed JSON value onto an [`AnalysisResult`].
///
/// All five fields must be present under one of their aliases. The code field
/// is a string; every other field is an array of non-empty strings.
pub fn shape_result(value: &Value, fields: &FieldAliases) -> Result<AnalysisResult, TierMiss> {
    let obj = value
        .as_object()
        .ok_or_else(|| TierMiss::new(format!("expected a JSON object, got {}", kind_of(value))))?;

    let corrected_code = match lookup(obj, &fields.corrected_code, "corrected_code")? {
        Value::String(s) => s.clone(),
        other => {
            return Err(TierMiss::new(format!(
                "'corrected_code' must be a string, got {}",
                kind_of(other)
            )))
        }
    };

    Ok(AnalysisResult {
        corrected_code,
        bugs: string_list(obj, &fields.bugs, "bugs")?,
        fixes: string_list(obj, &fields.fixes, "fixes")?,
        optimizations: string_list(obj, &fields.optimizations, "optimizations")?,
        explanation: string_list(obj, &fields.explanation, "explanation")?,
        error: None,
    })
}

fn lookup<'a>(
    obj: &'a Map<String, Value>,
    aliases: &[String],
    field: &str,
) -> Result<&'a Value, TierMiss> {
    aliases
        .iter()
        .find_map(|key| obj.get(key))
        .ok_or_else(|| TierMiss::new(format!("missing key '{field}'")))
}

fn string_list(
    obj: &Map<String, Value>,
    aliases: &[String],
    field: &str,
) -> Result<Vec<String>, TierMiss> {
    let items = lookup(obj, aliases, field)?
        .as_array()
        .ok_or_else(|| TierMiss::new(format!("'{field}' must be a list")))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
            Value::String(_) => Err(TierMiss::new(format!("'{field}[{i}]' is empty"))),
            other => Err(TierMiss::new(format!(
                "'{field}[{i}]' must be a string, got {}",
                kind_of(other)
            ))),
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
