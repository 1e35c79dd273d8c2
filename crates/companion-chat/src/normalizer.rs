//! Normalization of raw model replies into utterances.
//!
//! The model is asked for a bare JSON array but sometimes wraps it in an
//! object under `messages`. Both shapes are accepted and decode to the
//! same list.

use crate::error::ChatError;
use companion_types::{Animation, FacialExpression, Utterance};
use serde::Deserialize;

/// The accepted reply shapes, tried in order.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModelReply {
    Bare(Vec<ModelUtterance>),
    Wrapped { messages: Vec<ModelUtterance> },
}

/// An utterance as the model writes it. Anything else the model adds,
/// including an `audio` field, is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelUtterance {
    text: String,
    #[serde(default)]
    facial_expression: FacialExpression,
    #[serde(default)]
    animation: Animation,
}

impl From<ModelUtterance> for Utterance {
    fn from(m: ModelUtterance) -> Self {
        Utterance {
            text: m.text,
            facial_expression: m.facial_expression,
            animation: m.animation,
            audio: None,
        }
    }
}

/// Parses a raw model reply into an ordered list of utterances without audio.
///
/// # Errors
///
/// Returns `ChatError::MalformedModelOutput` if `raw` is not JSON, or is
/// JSON of neither accepted shape.
pub fn normalize(raw: &str) -> Result<Vec<Utterance>, ChatError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ChatError::MalformedModelOutput(format!("reply is not JSON: {}", e)))?;

    let reply = ModelReply::deserialize(value).map_err(|_| {
        ChatError::MalformedModelOutput(
            "expected an array of utterances or an object with a `messages` array".to_string(),
        )
    })?;

    let utterances = match reply {
        ModelReply::Bare(items) | ModelReply::Wrapped { messages: items } => items,
    };

    Ok(utterances.into_iter().map(Utterance::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str = r#"[
        {"text": "Hi!", "facialExpression": "smile", "animation": "Talking_0"},
        {"text": "I missed you.", "facialExpression": "sad", "animation": "Crying"},
        {"text": "Let's dance!", "facialExpression": "funnyFace", "animation": "Rumba"}
    ]"#;

    #[test]
    fn bare_and_wrapped_shapes_are_equivalent() {
        let bare = normalize(ITEMS).unwrap();
        let wrapped = normalize(&format!(r#"{{"messages": {}}}"#, ITEMS)).unwrap();

        assert_eq!(bare.len(), 3);
        assert_eq!(bare, wrapped);
        assert_eq!(bare[0].text, "Hi!");
        assert_eq!(bare[1].animation, Animation::Crying);
        assert_eq!(bare[2].facial_expression, FacialExpression::FunnyFace);
    }

    #[test]
    fn single_utterance_in_both_shapes() {
        let one = r#"[{"text": "Hey", "facialExpression": "default", "animation": "Idle"}]"#;
        assert_eq!(
            normalize(one).unwrap(),
            normalize(&format!(r#"{{"messages": {}}}"#, one)).unwrap()
        );
    }

    #[test]
    fn rejects_non_json() {
        let err = normalize("not json").unwrap_err();
        assert!(matches!(err, ChatError::MalformedModelOutput(_)), "got {:?}", err);
    }

    #[test]
    fn rejects_object_without_messages() {
        let err = normalize(r#"{"foo": 1}"#).unwrap_err();
        assert!(matches!(err, ChatError::MalformedModelOutput(_)), "got {:?}", err);
    }

    #[test]
    fn rejects_non_array_messages() {
        let err = normalize(r#"{"messages": "hello"}"#).unwrap_err();
        assert!(matches!(err, ChatError::MalformedModelOutput(_)), "got {:?}", err);
    }

    #[test]
    fn unknown_vocabulary_passes_through() {
        let raw = r#"[{"text": "Hmm", "facialExpression": "smirk", "animation": "Moonwalk"}]"#;
        let utterances = normalize(raw).unwrap();
        assert_eq!(
            utterances[0].facial_expression,
            FacialExpression::Other("smirk".to_string())
        );
        assert_eq!(utterances[0].animation, Animation::Other("Moonwalk".to_string()));
    }

    #[test]
    fn model_supplied_audio_is_discarded() {
        let raw = r#"[{"text": "Hi", "audio": "bm9wZQ=="}]"#;
        let utterances = normalize(raw).unwrap();
        assert_eq!(utterances[0].audio, None);
        assert_eq!(utterances[0].facial_expression, FacialExpression::Default);
        assert_eq!(utterances[0].animation, Animation::Idle);
    }

    #[test]
    fn empty_array_is_accepted() {
        assert!(normalize("[]").unwrap().is_empty());
    }
}
