//! The instruction that tells the model how to reply.

use companion_types::{Animation, FacialExpression, MAX_UTTERANCES_PER_REPLY};

pub const DEFAULT_PERSONA: &str = "You are a virtual companion.";

/// Builds the system instruction describing the reply contract.
///
/// The vocabularies are rendered from [`FacialExpression::KNOWN`] and
/// [`Animation::KNOWN`] so the prompt cannot drift from the types.
pub fn system_instruction(persona: &str) -> String {
    let known_expressions = FacialExpression::KNOWN;
    let known_animations = Animation::KNOWN;
    let expressions: Vec<&str> = known_expressions.iter().map(|e| e.as_str()).collect();
    let animations: Vec<&str> = known_animations.iter().map(|a| a.as_str()).collect();

    format!(
        "{persona} You will always reply with a JSON array of messages. \
         With a maximum of {max} messages. \
         Each message has a text, facialExpression, and animation property. \
         The different facial expressions are: {expressions}. \
         The different animations are: {animations}.",
        persona = persona.trim(),
        max = MAX_UTTERANCES_PER_REPLY,
        expressions = join_list(&expressions),
        animations = join_list(&animations),
    )
}

/// `a`, `a and b`, `a, b, and c`.
fn join_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => (*one).to_string(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}
