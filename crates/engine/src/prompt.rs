//! Prompt construction for generation and refinement.
//!
//! Everything here is pure string assembly: same inputs, same prompt.

/// System instruction sent with every generation request.
pub const GENERATION_SYSTEM_MESSAGE: &str =
    "You are an assistant helping to create documents that comply with company policy.";

/// System instruction sent with every refinement request.
pub const REFINEMENT_SYSTEM_MESSAGE: &str =
    "You are an assistant helping to refine documents to comply with company policy.";

/// Content stored when the generator cannot produce a document.
pub const FALLBACK_CONTENT: &str = "Error: Unable to generate text. It appears the policy isn't clear on this matter. Please take appropriate action based on your judgment.";

/// Frame a filled request and its rendered policy context for first generation.
pub fn build_generation_prompt(filled_request: &str, rendered_context: &str) -> String {
    format!(
        "USER REQUEST:\n\
         {filled_request}\n\
         \n\
         RELEVANT POLICY SECTIONS:\n\
         {rendered_context}\n\
         \n\
         Please generate a well-formatted, policy-compliant document based on the user's request.\n\
         Ensure that all information complies with the provided policy sections.\n\
         If the policy is unclear or missing relevant information, please indicate this in your response.\n"
    )
}

/// Frame a refinement round.
///
/// `filled_request` and `rendered_context` must come from the document's
/// creation-time snapshot, not from a fresh retrieval.
pub fn build_refinement_prompt(
    prior_content: &str,
    feedback: &str,
    filled_request: &str,
    rendered_context: &str,
) -> String {
    format!(
        "You previously generated this document:\n\
         {prior_content}\n\
         \n\
         The user has provided the following feedback:\n\
         {feedback}\n\
         \n\
         Original request:\n\
         {filled_request}\n\
         \n\
         Relevant policy sections:\n\
         {rendered_context}\n\
         \n\
         Please refine the document based on the user's feedback while ensuring it remains compliant with policy.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_prompt_layout() {
        let prompt = build_generation_prompt("Draft a memo about remote work", "From a.txt:\nRule");
        assert!(prompt.starts_with("USER REQUEST:\nDraft a memo about remote work\n\nRELEVANT POLICY SECTIONS:\nFrom a.txt:\nRule\n\n"));
        assert!(prompt.contains("policy-compliant document"));
        assert!(prompt.ends_with("please indicate this in your response.\n"));
    }

    #[test]
    fn generation_prompt_asks_to_flag_gaps() {
        let prompt = build_generation_prompt("x", "y");
        assert!(prompt.contains("If the policy is unclear or missing relevant information"));
    }

    #[test]
    fn refinement_prompt_orders_sections() {
        let prompt = build_refinement_prompt("v1 text", "shorter please", "the request", "the context");
        let positions: Vec<usize> = ["v1 text", "shorter please", "the request", "the context"]
            .iter()
            .map(|part| prompt.find(part).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.starts_with("You previously generated this document:\nv1 text\n\n"));
        assert!(prompt.ends_with("remains compliant with policy.\n"));
    }

    #[test]
    fn prompts_are_deterministic() {
        assert_eq!(build_generation_prompt("a", "b"), build_generation_prompt("a", "b"));
        assert_eq!(
            build_refinement_prompt("a", "b", "c", "d"),
            build_refinement_prompt("a", "b", "c", "d")
        );
    }

    #[test]
    fn braces_in_inputs_are_kept_verbatim() {
        let prompt = build_generation_prompt("{name} and {}", "none");
        assert!(prompt.contains("{name} and {}"));
    }
}
