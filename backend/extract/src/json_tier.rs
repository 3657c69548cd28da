//! Strict and repaired JSON tiers.

use bugscope_core::{AnalysisResult, FieldAliases};
use serde_json::Value;
use tracing::trace;

use crate::repair::{balanced_objects, repair_json};
use crate::sanitize::{sanitize_control_chars, strip_fences};
use crate::shape::shape_result;
use crate::tier::{ParseTier, TierMiss};

/// Parse the fence-stripped, sanitized reply as-is.
pub struct DirectJsonTier {
    fields: FieldAliases,
}

impl DirectJsonTier {
    pub fn new(fields: FieldAliases) -> Self {
        Self { fields }
    }
}

impl ParseTier for DirectJsonTier {
    fn name(&self) -> &'static str {
        "direct-json"
    }

    fn try_parse(&self, raw: &str) -> Result<AnalysisResult, TierMiss> {
        let cleaned = sanitize_control_chars(strip_fences(raw));
        let value: Value = serde_json::from_str(&cleaned)
            .map_err(|e| TierMiss::new(format!("invalid JSON: {e}")))?;
        shape_result(&value, &self.fields)
    }
}

/// Repair common near-JSON mistakes, then fall back to the first balanced
/// object found in the text.
pub struct RepairedJsonTier {
    fields: FieldAliases,
}

impl RepairedJsonTier {
    pub fn new(fields: FieldAliases) -> Self {
        Self { fields }
    }

    fn parse_candidate(&self, text: &str) -> Result<AnalysisResult, TierMiss> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| TierMiss::new(format!("invalid JSON: {e}")))?;
        shape_result(&value, &self.fields)
    }
}

impl ParseTier for RepairedJsonTier {
    fn name(&self) -> &'static str {
        "repaired-json"
    }

    fn try_parse(&self, raw: &str) -> Result<AnalysisResult, TierMiss> {
        let cleaned = sanitize_control_chars(strip_fences(raw));

        let whole = match self.parse_candidate(&repair_json(&cleaned)) {
            Ok(result) => return Ok(result),
            Err(miss) => miss,
        };

        let mut spans = 0usize;
        let mut last_shape_miss: Option<TierMiss> = None;
        for span in balanced_objects(&cleaned) {
            spans += 1;
            for candidate in [span.to_string(), repair_json(span)] {
                match self.parse_candidate(&candidate) {
                    Ok(result) => return Ok(result),
                    Err(miss) => {
                        trace!(reason = %miss, "Balanced span rejected");
                        if !miss.reason.starts_with("invalid JSON") {
                            last_shape_miss.get_or_insert(miss);
                        }
                    }
                }
            }
        }

        let reason = match (spans, last_shape_miss) {
            (0, _) => format!("{whole}; no balanced object found"),
            (_, Some(shape)) => format!("{whole}; embedded object rejected: {shape}"),
            (n, None) => format!("{whole}; none of {n} embedded objects parsed"),
        };
        Err(TierMiss::new(reason))
    }
}

/// True when the reply is, or embeds, a JSON object using any analysis key.
///
/// Such a reply was written as JSON; if both JSON tiers rejected it, reading
/// its lines as markdown would only recover fragments of the object.
pub fn holds_analysis_object(raw: &str, fields: &FieldAliases) -> bool {
    let cleaned = sanitize_control_chars(strip_fences(raw));
    if cleaned.trim_start().starts_with('{') {
        return true;
    }
    let keys: Vec<&str> = [
        &fields.corrected_code,
        &fields.bugs,
        &fields.fixes,
        &fields.optimizations,
        &fields.explanation,
    ]
    .into_iter()
    .flatten()
    .map(String::as_str)
    .collect();

    let found = balanced_objects(&cleaned)
        .flat_map(|span| [span.to_string(), repair_json(span)])
        .filter_map(|candidate| serde_json::from_str::<Value>(&candidate).ok())
        .any(|value| {
            value
                .as_object()
                .is_some_and(|obj| keys.iter().any(|key| obj.contains_key(*key)))
        });
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{"corrected_code": "def f():\n    return 1", "bugs": ["b1", "b2"], "fixes": ["f1"], "optimizations": ["o1"], "explanation": ["e1"]}"#;

    #[test]
    fn direct_parses_fenced_json() {
        let fenced = format!("```json\n{REPLY}\n```");
        let result = DirectJsonTier::new(FieldAliases::default()).try_parse(&fenced).unwrap();
        assert_eq!(result.corrected_code, "def f():\n    return 1");
        assert_eq!(result.bugs, vec!["b1", "b2"]);
    }

    #[test]
    fn direct_accepts_raw_newlines_in_strings() {
        let raw = "{\"corrected_code\": \"a\nb\", \"bugs\": [], \"fixes\": [], \"optimizations\": [], \"explanation\": []}";
        let result = DirectJsonTier::new(FieldAliases::default()).try_parse(raw).unwrap();
        assert_eq!(result.corrected_code, "a\nb");
    }

    #[test]
    fn direct_declines_prose() {
        let wrapped = format!("Here is the result:\n{REPLY}\nHope that helps!");
        assert!(DirectJsonTier::new(FieldAliases::default()).try_parse(&wrapped).is_err());
    }

    #[test]
    fn repaired_handles_python_style_dict() {
        let raw = "{'corrected_code': 'x = None', 'bugs': ['uses \"x\"',], 'fixes': [], 'optimizations': [], 'explanation': [],}";
        let result = RepairedJsonTier::new(FieldAliases::default()).try_parse(raw).unwrap();
        assert_eq!(result.corrected_code, "x = None");
        assert_eq!(result.bugs, vec!["uses \"x\""]);
    }

    #[test]
    fn repaired_finds_embedded_object() {
        let wrapped = format!("Here's the result:\n{REPLY}\nHope that helps!");
        let result = RepairedJsonTier::new(FieldAliases::default()).try_parse(&wrapped).unwrap();
        assert_eq!(result.explanation, vec!["e1"]);
    }

    #[test]
    fn repaired_reports_shape_miss() {
        let wrapped = "Result: {\"bugs\": []} done";
        let miss = RepairedJsonTier::new(FieldAliases::default()).try_parse(wrapped).unwrap_err();
        assert!(miss.reason.contains("missing key 'corrected_code'"));
    }

    #[test]
    fn detects_json_replies_and_embedded_objects() {
        let fields = FieldAliases::default();
        assert!(holds_analysis_object("{\"bugs\": [", &fields));
        assert!(holds_analysis_object(
            "Result:\n{'issues': ['x'], 'fixes': []}\nDone.",
            &fields
        ));
    }

    #[test]
    fn code_dicts_are_not_analysis_objects() {
        let raw = "### Corrected Code\n```python\nconfig = {'retries': 3}\n```\n### Explanation\n- ok";
        assert!(!holds_analysis_object(raw, &FieldAliases::default()));
    }
}
