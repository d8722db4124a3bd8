//! Turning raw provider text into typed values.
//!
//! LLM output is often wrapped in Markdown fences or keyed inconsistently; these helpers
//! accept both a bare JSON array and an object wrapping it.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::state::{Concept, Mcq, ParameterValues, Takeaway, Understanding, UnderstandingStatus};

use super::ProviderError;

/// Strips a surrounding ```` ``` ```` / ```` ```json ```` fence if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let t = raw.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string (e.g. `json`) on the opening line.
    match rest.split_once('\n') {
        Some((info, body)) if !info.trim().contains(' ') => body.trim(),
        _ => rest.trim(),
    }
}

fn parse_value(raw: &str) -> Result<Value, ProviderError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ProviderError::Empty);
    }
    serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// Decodes `T` from fenced or bare JSON.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, ProviderError> {
    let v = parse_value(raw)?;
    serde_json::from_value(v).map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// A list either bare or under one of `keys` (first array field as last resort).
fn parse_list<T: DeserializeOwned>(raw: &str, keys: &[&str]) -> Result<Vec<T>, ProviderError> {
    let v = parse_value(raw)?;
    let list = match v {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => {
            let named = keys.iter().find_map(|k| map.remove(*k));
            match named {
                Some(list) => list,
                None => map
                    .into_iter()
                    .map(|(_, v)| v)
                    .find(Value::is_array)
                    .ok_or_else(|| ProviderError::Malformed(format!("no list under {keys:?}")))?,
            }
        }
        other => {
            return Err(ProviderError::Malformed(format!(
                "expected list, got {}",
                type_name(&other)
            )))
        }
    };
    let items: Vec<T> =
        serde_json::from_value(list).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    if items.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(items)
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

pub fn parse_concepts(raw: &str) -> Result<Vec<Concept>, ProviderError> {
    let concepts: Vec<Concept> = parse_list(raw, &["concepts"])?;
    let concepts: Vec<Concept> = concepts
        .into_iter()
        .filter(|c| !c.name.trim().is_empty())
        .collect();
    if concepts.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(concepts)
}

/// Takeaways with missing ids are numbered from 1 in order.
pub fn parse_takeaways(raw: &str) -> Result<Vec<Takeaway>, ProviderError> {
    let mut takeaways: Vec<Takeaway> = parse_list(raw, &["takeaways", "lesson_plan"])?;
    for (i, t) in takeaways.iter_mut().enumerate() {
        if t.id == 0 {
            t.id = i as u32 + 1;
        }
    }
    Ok(takeaways)
}

/// Only valid MCQs are kept; if none survive the response counts as empty.
pub fn parse_mcqs(raw: &str) -> Result<Vec<Mcq>, ProviderError> {
    let mcqs: Vec<Mcq> = parse_list(raw, &["mcqs", "questions"])?;
    let valid: Vec<Mcq> = mcqs.into_iter().filter(Mcq::is_valid).collect();
    if valid.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(valid)
}

/// `{"parameter_values": {...}}` or a flat object of values.
pub fn parse_parameter_values(raw: &str) -> Result<ParameterValues, ProviderError> {
    let v = parse_value(raw)?;
    let Value::Object(mut map) = v else {
        return Err(ProviderError::Malformed("expected object".into()));
    };
    let values = match map.remove("parameter_values") {
        Some(Value::Object(inner)) => inner,
        Some(_) => return Err(ProviderError::Malformed("parameter_values is not an object".into())),
        None => map,
    };
    if values.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(values.into_iter().collect())
}

#[derive(Deserialize)]
struct RawClassification {
    #[serde(default, alias = "understanding_level", alias = "label")]
    understanding: String,
    #[serde(default = "default_confidence")]
    confidence: f32,
    #[serde(default)]
    reasoning: String,
}

fn default_confidence() -> f32 {
    0.5
}

/// Classification from provider text.
///
/// JSON: unknown labels become `partial`, confidence is clamped. Plain text: a mention of
/// "understood" or "confused" selects that label at 0.7, anything else is `partial` at 0.5.
pub fn parse_classification(raw: &str) -> Result<UnderstandingStatus, ProviderError> {
    match parse_json::<RawClassification>(raw) {
        Ok(c) => {
            let label = Understanding::parse(&c.understanding).unwrap_or(Understanding::Partial);
            Ok(UnderstandingStatus::new(label, c.confidence, c.reasoning))
        }
        Err(ProviderError::Empty) => Err(ProviderError::Empty),
        Err(_) => {
            let text = raw.to_lowercase();
            let status = if text.contains("understood") {
                UnderstandingStatus::new(Understanding::Understood, 0.7, "inferred from free text")
            } else if text.contains("confused") {
                UnderstandingStatus::new(Understanding::Confused, 0.7, "inferred from free text")
            } else {
                UnderstandingStatus::new(Understanding::Partial, 0.5, "unparseable classification")
            };
            Ok(status)
        }
    }
}

/// Plain text; only emptiness is an error.
pub fn parse_text(raw: &str) -> Result<String, ProviderError> {
    let t = strip_code_fence(raw);
    if t.is_empty() {
        Err(ProviderError::Empty)
    } else {
        Ok(t.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_with_and_without_info_string() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn concepts_accept_bare_and_wrapped_lists() {
        let bare = r#"[{"name":"Period","description":"d","importance":"high"}]"#;
        let wrapped = r#"```json
{"concepts":[{"name":"Period"},{"name":"  "}]}
```"#;
        assert_eq!(parse_concepts(bare).unwrap()[0].name, "Period");
        let c = parse_concepts(wrapped).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].importance, "medium");
    }

    #[test]
    fn empty_and_malformed_are_distinguished() {
        assert_eq!(parse_concepts("  "), Err(ProviderError::Empty));
        assert_eq!(parse_concepts(r#"{"concepts": []}"#), Err(ProviderError::Empty));
        assert!(matches!(parse_concepts("not json"), Err(ProviderError::Malformed(_))));
        assert!(matches!(parse_concepts("42"), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn takeaways_get_sequential_ids() {
        let raw = r#"{"takeaways":[
            {"explanation":"a","probing_question":"q1"},
            {"id":7,"explanation":"b","probing_question":"q2","display_mode":"before_after"}
        ]}"#;
        let t = parse_takeaways(raw).unwrap();
        assert_eq!(t[0].id, 1);
        assert_eq!(t[1].id, 7);
        assert_eq!(t[1].display_mode, crate::state::DisplayMode::BeforeAfter);
    }

    #[test]
    fn invalid_mcqs_are_dropped() {
        let raw = r#"{"questions":[
            {"question":"Q1","options":["a","b"],"correct_answer":5},
            {"question":"Q2","options":["a","b","c"],"correct_answer":2}
        ]}"#;
        let m = parse_mcqs(raw).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].question, "Q2");
    }

    #[test]
    fn parameter_values_wrapped_or_flat() {
        let a = parse_parameter_values(r#"{"parameter_values":{"length":1.5}}"#).unwrap();
        let b = parse_parameter_values(r#"{"length":1.5}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(parse_parameter_values("{}"), Err(ProviderError::Empty));
    }

    #[test]
    fn classification_json_clamps_and_defaults_label() {
        let s = parse_classification(r#"{"understanding":"UNDERSTOOD","confidence":1.4}"#).unwrap();
        assert_eq!(s.label, Understanding::Understood);
        assert_eq!(s.confidence, 1.0);

        let s = parse_classification(r#"{"understanding":"meh","confidence":0.3}"#).unwrap();
        assert_eq!(s.label, Understanding::Partial);
        assert_eq!(s.confidence, 0.3);
    }

    #[test]
    fn classification_free_text_heuristics() {
        let s = parse_classification("The learner clearly understood it").unwrap();
        assert_eq!((s.label, s.confidence), (Understanding::Understood, 0.7));
        let s = parse_classification("Seems confused about damping").unwrap();
        assert_eq!((s.label, s.confidence), (Understanding::Confused, 0.7));
        let s = parse_classification("hmm").unwrap();
        assert_eq!((s.label, s.confidence), (Understanding::Partial, 0.5));
        assert_eq!(parse_classification(""), Err(ProviderError::Empty));
    }
}
