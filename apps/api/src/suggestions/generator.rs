//! Suggestion generator — prompt assembly and token budgeting for violated criteria.
//!
//! The completion text is passed through untouched; no structure is imposed on it.

use tracing::{debug, info};

use crate::classify::Criterion;
use crate::llm_client::{LlmError, TextGenerator};
use crate::suggestions::prompts::{
    AMBIGUITY_PROMPT_TEMPLATE, IMPROVE_PROMPT_TEMPLATE, WELL_FORMED_PROMPT_TEMPLATE,
};

const BASE_TOKENS: u32 = 200;
const TOKENS_PER_CRITERION: u32 = 50;
const SUGGESTIONS_PER_CRITERION: u32 = 5;
const TOKENS_PER_SUGGESTION: u32 = 100;
/// Upper bound on `max_new_tokens` for any suggestion request.
pub const MAX_SUGGESTION_TOKENS: u32 = 700;

/// Criteria whose prediction is explicitly 0. Absent predictions are not violations.
pub fn violated_criteria(
    well_formed_prediction: Option<i64>,
    ambiguity_prediction: Option<i64>,
) -> Vec<Criterion> {
    [
        (Criterion::WellFormed, well_formed_prediction),
        (Criterion::Ambiguity, ambiguity_prediction),
    ]
    .into_iter()
    .filter(|(_, prediction)| *prediction == Some(0))
    .map(|(criterion, _)| criterion)
    .collect()
}

/// base + per-criterion overhead + room for five ~100-token suggestions per criterion, capped.
pub fn token_budget(violations: usize) -> u32 {
    let n = violations as u32;
    let estimated_response = n * SUGGESTIONS_PER_CRITERION * TOKENS_PER_SUGGESTION;
    (BASE_TOKENS + n * TOKENS_PER_CRITERION + estimated_response).min(MAX_SUGGESTION_TOKENS)
}

fn template_for(criterion: Criterion) -> &'static str {
    match criterion {
        Criterion::WellFormed => WELL_FORMED_PROMPT_TEMPLATE,
        Criterion::Ambiguity => AMBIGUITY_PROMPT_TEMPLATE,
    }
}

/// One instruction block per violated criterion, newline-joined. `None` when nothing is violated.
pub fn build_prompt(user_story: &str, violations: &[Criterion]) -> Option<String> {
    if violations.is_empty() {
        return None;
    }
    let blocks: Vec<String> = violations
        .iter()
        .map(|c| template_for(*c).replace("{user_story}", user_story))
        .collect();
    Some(blocks.join("\n"))
}

/// Asks the LLM for suggestions covering `violations`. Returns an empty list without
/// calling the backend when the story violates nothing.
pub async fn generate_suggestions(
    llm: &dyn TextGenerator,
    user_story: &str,
    violations: &[Criterion],
) -> Result<Vec<String>, LlmError> {
    let Some(prompt) = build_prompt(user_story, violations) else {
        debug!("No criteria violated; skipping suggestion generation");
        return Ok(Vec::new());
    };

    let max_new_tokens = token_budget(violations.len());
    info!(
        "Generating suggestions for {:?} with {} (max_new_tokens={})",
        violations,
        llm.model(),
        max_new_tokens
    );
    llm.generate(&prompt, max_new_tokens).await
}

/// Open-ended improvement ideas for a story, regardless of its predictions.
pub async fn improve_user_story(
    llm: &dyn TextGenerator,
    user_story: &str,
) -> Result<Vec<String>, LlmError> {
    let prompt = IMPROVE_PROMPT_TEMPLATE.replace("{user_story}", user_story);
    info!("Generating improvement ideas with {}", llm.model());
    llm.generate(&prompt, MAX_SUGGESTION_TOKENS).await
}
