//! Response interpretation.
//!
//! Classifies free-form model output as structured (JSON activity list) or
//! narrative (plain note) and decodes it. Decode failures never propagate:
//! they become a single "Error" activity card.

use serde::Deserialize;
use walrus_core::{Activity, ChatCompletionResponse, InterpretedResult, WalrusError};

/// Card description when a structured reply fails to decode.
pub const DECODE_FAILURE_MESSAGE: &str = "Could not load activities.";
/// Card description when the relay round trip itself fails.
///
/// Lower-case on purpose: existing consumers match the two literals
/// separately.
pub const RELAY_FAILURE_MESSAGE: &str = "could not load activities.";
pub const ERROR_ACTIVITY_ID: &str = "error";
pub const ERROR_ACTIVITY_TITLE: &str = "Error";

/// Stand-in for an empty or absent reply.
const EMPTY_REPLY: &str = "[]";

/// Activity as the model writes it, before an id is assigned.
#[derive(Debug, Deserialize)]
struct RawActivity {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

/// Interpret one raw model reply.
///
/// Input is trimmed first, so a whitespace-only reply counts as empty and
/// yields an empty activity list rather than a blank note.
pub fn interpret(raw: &str) -> InterpretedResult {
    let trimmed = raw.trim();
    let text = if trimmed.is_empty() { EMPTY_REPLY } else { trimmed };

    if !is_structured(text) {
        return InterpretedResult::Note {
            text: text.to_string(),
        };
    }

    match decode_activities(text) {
        Ok(items) => InterpretedResult::Activities { items },
        Err(e) => {
            tracing::warn!(error = %e, "Error parsing structured response");
            decode_failure()
        }
    }
}

/// Interpret the first completion of a provider envelope.
pub fn interpret_completion(response: &ChatCompletionResponse) -> InterpretedResult {
    interpret(completion_text(response))
}

/// Text of the first completion, or `"[]"` when it is absent or empty.
pub fn completion_text(response: &ChatCompletionResponse) -> &str {
    response
        .first_content()
        .filter(|content| !content.is_empty())
        .unwrap_or(EMPTY_REPLY)
}

/// Structured replies start with `{` or `[`.
pub fn is_structured(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[')
}

/// Decode a JSON array of `{title, description}` objects, assigning
/// `activity-<index>` ids in order.
pub fn decode_activities(text: &str) -> walrus_core::Result<Vec<Activity>> {
    let raw: Vec<RawActivity> =
        serde_json::from_str(text).map_err(|e| WalrusError::Decode(e.to_string()))?;

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, activity)| {
            Activity::new(
                format!("activity-{}", index),
                activity.title,
                activity.description,
            )
        })
        .collect())
}

/// Soft failure for a reply that looked structured but did not decode.
pub fn decode_failure() -> InterpretedResult {
    soft_failure(DECODE_FAILURE_MESSAGE)
}

/// Soft failure for a failed relay round trip.
pub fn relay_failure() -> InterpretedResult {
    soft_failure(RELAY_FAILURE_MESSAGE)
}

fn soft_failure(description: &str) -> InterpretedResult {
    InterpretedResult::Activities {
        items: vec![Activity::new(
            ERROR_ACTIVITY_ID,
            ERROR_ACTIVITY_TITLE,
            description,
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(result: &InterpretedResult) -> &[Activity] {
        match result {
            InterpretedResult::Activities { items } => items,
            other => panic!("expected activities, got {:?}", other),
        }
    }

    // =========================================================================
    // Structured path
    // =========================================================================

    #[test]
    fn test_structured_list_assigns_sequential_ids() {
        let raw = r#"[
            {"title": "Icebreaker", "description": "5 min intro"},
            {"title": "Lightning talks", "description": "3 x 5 min"},
            {"title": "Retro", "description": "Wrap up"}
        ]"#;
        let result = interpret(raw);
        let acts = items(&result);

        assert_eq!(acts.len(), 3);
        assert_eq!(acts[0], Activity::new("activity-0", "Icebreaker", "5 min intro"));
        assert_eq!(acts[1].id, "activity-1");
        assert_eq!(acts[1].title, "Lightning talks");
        assert_eq!(acts[2].id, "activity-2");
        assert_eq!(acts[2].description, "Wrap up");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let raw = r#"[{"title":"A","description":"x"},{"title":"A","description":"x"}]"#;
        let result = interpret(raw);
        let acts = items(&result);
        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].id, "activity-0");
        assert_eq!(acts[1].id, "activity-1");
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed_before_classification() {
        let result = interpret("\n\n   [{\"title\":\"T\",\"description\":\"D\"}]  \n");
        assert_eq!(items(&result).len(), 1);
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert_eq!(
            interpret("[]"),
            InterpretedResult::Activities { items: vec![] }
        );
    }

    #[test]
    fn test_empty_and_blank_input_defaults_to_empty_list() {
        for raw in ["", "   ", "\n\t"] {
            assert_eq!(
                interpret(raw),
                InterpretedResult::Activities { items: vec![] }
            );
        }
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let result = interpret(r#"[{"title":"Only a title"},{"description":"Only a description"}]"#);
        let acts = items(&result);
        assert_eq!(acts[0].description, "");
        assert_eq!(acts[1].title, "");
    }

    #[test]
    fn test_round_trip_reassigns_fresh_ids() {
        let source = json!([
            {"title": "Warm-up", "description": "Pair introductions"},
            {"title": "Deep dive", "description": "Architecture walkthrough"}
        ]);
        let result = interpret(&source.to_string());
        let acts = items(&result);

        assert_eq!(acts.len(), 2);
        for (index, (activity, original)) in acts.iter().zip(source.as_array().unwrap()).enumerate() {
            assert_eq!(activity.id, format!("activity-{}", index));
            assert_eq!(activity.title, original["title"]);
            assert_eq!(activity.description, original["description"]);
        }
    }

    // =========================================================================
    // Soft failures
    // =========================================================================

    #[test]
    fn test_invalid_json_yields_single_error_card() {
        let result = interpret("{not valid");
        assert_eq!(result, decode_failure());
        let acts = items(&result);
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].id, "error");
        assert_eq!(acts[0].title, "Error");
        assert_eq!(acts[0].description, "Could not load activities.");
    }

    #[test]
    fn test_truncated_array_is_decode_failure() {
        assert_eq!(
            interpret(r#"[{"title":"Icebreaker","description":"5 min"#),
            decode_failure()
        );
    }

    #[test]
    fn test_bare_object_is_decode_failure() {
        assert_eq!(
            interpret(r#"{"title":"Icebreaker","description":"5 min intro"}"#),
            decode_failure()
        );
    }

    #[test]
    fn test_array_of_non_objects_is_decode_failure() {
        assert_eq!(interpret(r#"["one", "two"]"#), decode_failure());
    }

    #[test]
    fn test_failure_literals_differ_only_in_case() {
        let decode = decode_failure();
        let relay = relay_failure();
        let d = &items(&decode)[0].description;
        let r = &items(&relay)[0].description;
        assert_eq!(d, "Could not load activities.");
        assert_eq!(r, "could not load activities.");
        assert_ne!(d, r);
        assert_eq!(d.to_lowercase(), r.to_lowercase());
    }

    // =========================================================================
    // Narrative path
    // =========================================================================

    #[test]
    fn test_narrative_becomes_trimmed_note() {
        assert_eq!(
            interpret("  Here are some notes.\n"),
            InterpretedResult::Note {
                text: "Here are some notes.".to_string()
            }
        );
    }

    #[test]
    fn test_narrative_with_embedded_json_stays_note() {
        let raw = r#"Sure! [{"title":"A","description":"B"}]"#;
        assert_eq!(
            interpret(raw),
            InterpretedResult::Note {
                text: raw.to_string()
            }
        );
    }

    // =========================================================================
    // Envelope handling
    // =========================================================================

    #[test]
    fn test_completion_text_falls_back_to_empty_list() {
        assert_eq!(completion_text(&ChatCompletionResponse::default()), "[]");
        assert_eq!(
            completion_text(&ChatCompletionResponse::with_content("")),
            "[]"
        );
        assert_eq!(
            completion_text(&ChatCompletionResponse::with_content("hello")),
            "hello"
        );
    }

    #[test]
    fn test_interpret_completion() {
        let envelope = ChatCompletionResponse::with_content("Consider icebreakers.");
        assert_eq!(
            interpret_completion(&envelope),
            InterpretedResult::Note {
                text: "Consider icebreakers.".to_string()
            }
        );

        let empty = ChatCompletionResponse::default();
        assert_eq!(
            interpret_completion(&empty),
            InterpretedResult::Activities { items: vec![] }
        );
    }

    #[test]
    fn test_interpret_completion_with_null_choices() {
        let envelope: ChatCompletionResponse =
            serde_json::from_value(json!({"id": "chatcmpl-1", "choices": null})).unwrap();
        assert_eq!(
            interpret_completion(&envelope),
            InterpretedResult::Activities { items: vec![] }
        );
    }

    #[test]
    fn test_is_structured() {
        assert!(is_structured("[1]"));
        assert!(is_structured("{\"a\":1}"));
        assert!(!is_structured("Here"));
        assert!(!is_structured("1, 2, 3"));
    }
}
