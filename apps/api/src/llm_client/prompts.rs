// Cross-cutting prompt fragments.
// Each agent's own template lives in agents/prompts.rs; this file holds
// instructions shared by several of them.

/// Appended to every prompt whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Respond with valid JSON only. \
Do NOT include any text before or after the JSON. \
Do NOT use markdown code fences. \
Do NOT include explanations or apologies.";

/// Appended to prompts whose reply must be a single bare value.
pub const SINGLE_VALUE_INSTRUCTION: &str = "\
Respond ONLY with the requested value. \
Do NOT include explanations, labels, punctuation, or extra text.";

/// Renders a bullet list, one `- item` per line, for embedding name lists in prompts.
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_list_one_line_per_item() {
        assert_eq!(bullet_list(&["SQL", "Leadership"]), "- SQL\n- Leadership");
    }

    #[test]
    fn test_bullet_list_empty() {
        assert_eq!(bullet_list::<&str>(&[]), "");
    }
}
