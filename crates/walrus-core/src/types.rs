use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Activities and interpreted results
// =============================================================================

/// A single workshop activity card.
///
/// `id` is assigned on the client and is not part of the model's reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl Activity {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Outcome of interpreting one model reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterpretedResult {
    /// Ordered activity cards (possibly empty).
    Activities { items: Vec<Activity> },
    /// Plain narrative text shown verbatim.
    Note { text: String },
    /// A failure rejected before any round trip.
    Error { message: String },
}

impl InterpretedResult {
    /// Activity cards carried by this result, empty for notes and errors.
    pub fn activities(&self) -> &[Activity] {
        match self {
            InterpretedResult::Activities { items } => items,
            _ => &[],
        }
    }

    /// Narrative text, if this result is a note.
    pub fn note(&self) -> Option<&str> {
        match self {
            InterpretedResult::Note { text } => Some(text),
            _ => None,
        }
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Body of `POST /api/chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}

/// One message of an upstream chat-completion conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// The provider's response envelope.
///
/// Only `choices[0].message.content` is consumed; every other field is
/// ignored on decode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<CompletionChoice>,
}

/// `null` decodes as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<CompletionMessage>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first completion, if the provider sent one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }

    /// Build a single-choice envelope around `content`.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                message: Some(CompletionMessage {
                    content: Some(content.into()),
                }),
            }],
        }
    }
}
