//! Strict parser for the model's suggestion output.
//!
//! The model is told to answer with a bare JSON array of
//! `{text, confidence, category}` objects. Anything else (prose, a JSON
//! object, an unknown category, a confidence outside `[0, 1]`) is rejected
//! as a whole; there is no repair and no partial acceptance.

use serde_json::Value;

use super::errors::SuggestionError;
use super::types::Suggestion;

/// Parse the raw model text as a suggestion array.
pub fn parse_suggestions(raw: &str) -> Result<Vec<Suggestion>, SuggestionError> {
    let malformed = |reason: String| SuggestionError::MalformedResponse {
        raw_response: raw.to_string(),
        reason,
    };

    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| malformed(format!("not valid JSON: {e}")))?;

    if !value.is_array() {
        return Err(malformed(format!(
            "expected a JSON array, got {}",
            json_kind(&value)
        )));
    }

    let suggestions: Vec<Suggestion> =
        serde_json::from_value(value).map_err(|e| malformed(format!("bad suggestion: {e}")))?;

    if let Some(bad) = suggestions
        .iter()
        .find(|s| !(0.0..=1.0).contains(&s.confidence))
    {
        return Err(malformed(format!(
            "confidence {} out of range for \"{}\"",
            bad.confidence, bad.text
        )));
    }

    Ok(suggestions)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestions::types::SuggestionCategory;

    #[test]
    fn parse_well_formed_array() {
        let raw = r#"[
            {"text":"How does X scale?","confidence":0.9,"category":"followUp"},
            {"text":"What are alternatives to X?","confidence":0.6,"category":"exploration"},
            {"text":"Which version of X?","confidence":0.3,"category":"clarification"}
        ]"#;
        let suggestions = parse_suggestions(raw).unwrap();
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].category, SuggestionCategory::FollowUp);
        assert_eq!(suggestions[2].category, SuggestionCategory::Clarification);
        assert!((suggestions[1].confidence - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        let raw = "\n  [{\"text\":\"q\",\"confidence\":1,\"category\":\"followUp\"}]  \n";
        assert_eq!(parse_suggestions(raw).unwrap().len(), 1);
    }

    #[test]
    fn parse_rejects_prose() {
        let err = parse_suggestions("Sure! Here are some questions.").unwrap_err();
        assert!(matches!(err, SuggestionError::MalformedResponse { .. }));
    }

    #[test]
    fn parse_rejects_object() {
        let raw = r#"{"suggestions":[{"text":"q","confidence":0.5,"category":"followUp"}]}"#;
        let err = parse_suggestions(raw).unwrap_err();
        assert!(err.to_string().contains("expected a JSON array, got an object"));
    }

    #[test]
    fn parse_rejects_code_fence() {
        let raw = "```json\n[]\n```";
        assert!(parse_suggestions(raw).is_err());
    }

    #[test]
    fn parse_rejects_unknown_category() {
        let raw = r#"[{"text":"q","confidence":0.5,"category":"tangent"}]"#;
        assert!(parse_suggestions(raw).is_err());
    }

    #[test]
    fn parse_rejects_out_of_range_confidence() {
        let raw = r#"[{"text":"q","confidence":1.5,"category":"followUp"}]"#;
        let err = parse_suggestions(raw).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn parse_rejects_missing_field() {
        let raw = r#"[{"text":"q","category":"followUp"}]"#;
        assert!(parse_suggestions(raw).is_err());
    }

    #[test]
    fn parse_keeps_raw_response() {
        match parse_suggestions("nope") {
            Err(SuggestionError::MalformedResponse { raw_response, .. }) => {
                assert_eq!(raw_response, "nope")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
