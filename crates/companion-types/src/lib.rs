//! Shared types for the companion backend.
//!
//! This crate holds the wire-level data model used by every other crate in
//! the workspace: the expressive [`Utterance`] produced by the chat pipeline
//! and the [`Character`] profile owned by the character adapter.
//!
//! Nothing here performs I/O. Keeping the types in a leaf crate lets the
//! chat pipeline and the character service evolve independently while
//! agreeing on the JSON shapes the avatar frontend and the agent runtime
//! consume.

mod character;
mod utterance;

pub use character::{Appearance, Character, CharacterDraft, Personality, VoiceConfig, VoiceType};
pub use utterance::{Animation, ChatRequest, ChatResponse, FacialExpression, Utterance};

/// Maximum number of utterances the hosted model is asked to produce per reply.
///
/// This is a contract with the model, not a structural limit: responses
/// with more entries are passed through.
pub const MAX_UTTERANCES_PER_REPLY: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facial_expression_round_trip() {
        for expr in FacialExpression::KNOWN {
            let s = expr.as_str();
            assert_eq!(FacialExpression::from(s.to_string()), expr);
        }
    }

    #[test]
    fn animation_round_trip() {
        for anim in Animation::KNOWN {
            let s = anim.as_str();
            assert_eq!(Animation::from(s.to_string()), anim);
        }
    }

    #[test]
    fn unknown_vocabulary_passes_through() {
        let expr = FacialExpression::from("smirk".to_string());
        assert_eq!(expr, FacialExpression::Other("smirk".to_string()));
        assert_eq!(expr.as_str(), "smirk");

        let anim = Animation::from("Dancing".to_string());
        assert_eq!(anim, Animation::Other("Dancing".to_string()));
        assert_eq!(anim.as_str(), "Dancing");
    }

    #[test]
    fn utterance_wire_shape() {
        let utterance = Utterance {
            text: "Hi".to_string(),
            facial_expression: FacialExpression::FunnyFace,
            animation: Animation::Talking0,
            audio: None,
        };
        let json = serde_json::to_value(&utterance).unwrap();
        assert_eq!(json["text"], "Hi");
        assert_eq!(json["facialExpression"], "funnyFace");
        assert_eq!(json["animation"], "Talking_0");
        assert!(json.get("audio").is_none(), "absent audio is omitted");
    }

    #[test]
    fn utterance_defaults_missing_annotations() {
        let utterance: Utterance = serde_json::from_str(r#"{"text":"Hello"}"#).unwrap();
        assert_eq!(utterance.facial_expression, FacialExpression::Default);
        assert_eq!(utterance.animation, Animation::Idle);
    }

    #[test]
    fn chat_request_message_is_optional() {
        let empty: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.message.is_none());
        assert!(empty.is_greeting());

        let blank: ChatRequest = serde_json::from_str(r#"{"message":""}"#).unwrap();
        assert!(blank.is_greeting());

        let spaces: ChatRequest = serde_json::from_str(r#"{"message":"   "}"#).unwrap();
        assert!(!spaces.is_greeting());

        let real: ChatRequest = serde_json::from_str(r#"{"message":"hey"}"#).unwrap();
        assert!(!real.is_greeting());
    }
}
