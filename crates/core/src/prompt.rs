//! Instruction text sent to the model on every extraction call.

/// System prompt: taxonomy, extraction rules and output contract.
pub const SYSTEM_PROMPT: &str = include_str!("../prompts/policy_extraction_v1.txt");

pub const PROMPT_VERSION: &str = "policy_extraction_v1";

/// Wraps trimmed supplier text in the literal delimiter the prompt expects.
pub fn build_user_message(policy_text: &str) -> String {
    format!("Policy text:\n\"\"\"{policy_text}\"\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn user_message_uses_triple_quote_delimiter() {
        assert_eq!(
            build_user_message("Pets allowed."),
            "Policy text:\n\"\"\"Pets allowed.\"\"\""
        );
    }

    #[test]
    fn prompt_names_every_category() {
        for category in Category::ALL {
            assert!(
                SYSTEM_PROMPT.contains(category.as_slug()),
                "missing {}",
                category.as_slug()
            );
        }
        assert!(SYSTEM_PROMPT.ends_with(r#"return: {"policies": []}"#));
    }
}
