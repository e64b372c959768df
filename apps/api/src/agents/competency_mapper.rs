//! Role → competency mapper: which taxonomy entries a role needs most.

use tracing::warn;

use crate::agents::prompts::ROLE_COMPETENCY_TEMPLATE;
use crate::llm_client::prompts::bullet_list;
use crate::llm_client::CompletionModel;

/// Suggestions beyond this many are dropped before any per-competency lookup,
/// bounding the level-estimation calls that follow.
pub const MAX_ROLE_COMPETENCIES: usize = 5;

/// Returns at most `MAX_ROLE_COMPETENCIES` names, in the model's order.
/// Names are NOT resolved here; callers must check them against the store.
pub async fn map_competencies_for_role(
    role: &str,
    competency_names: &[String],
    model: &dyn CompletionModel,
) -> Vec<String> {
    let prompt = ROLE_COMPETENCY_TEMPLATE
        .replace("{role}", role)
        .replace("{competency_list}", &bullet_list(competency_names));

    match model.complete(&prompt, &[]).await {
        Ok(reply) => parse_name_list(&reply),
        Err(e) => {
            warn!("Competency mapping for role '{role}' failed: {e}");
            Vec::new()
        }
    }
}

/// Splits a comma- or newline-separated reply into clean names.
fn parse_name_list(reply: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for raw in reply.split(|c| c == ',' || c == '\n') {
        let name = raw
            .trim()
            .trim_start_matches(&['-', '*', '•'][..])
            .trim()
            .trim_matches(&['"', '\''][..])
            .trim_end_matches('.')
            .trim();
        if name.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            continue;
        }
        names.push(name.to_string());
        if names.len() == MAX_ROLE_COMPETENCIES {
            break;
        }
    }
    names
}
