//! Agent turn: render the category's prompt, call the LLM once, and turn failures into a reply.
//!
//! There is one agent per category, and they differ only in persona text, so a category selects
//! a `PromptTemplate` rather than being its own type.

use crate::llm::LlmBackend;
use crate::routing::Category;

const LENGTH_CONSTRAINT: &str = "Keep response under 100 words.";
const LANGUAGE_INSTRUCTION: &str = "Reply in Roman Urdu, be helpful and friendly.";

/// Fixed prompt text for one category.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub persona: &'static str,
    pub focus: &'static str,
}

/// Template for `category`.
pub fn template(category: Category) -> PromptTemplate {
    match category {
        Category::Restaurant => PromptTemplate {
            persona: "You are a Pakistani restaurant assistant.",
            focus: "Help with: food recommendations, restaurant suggestions, menu questions.",
        },
        Category::Weather => PromptTemplate {
            persona: "You are a Pakistani weather assistant.",
            focus: "Help with: weather info, temperature, forecasts.",
        },
        Category::General => PromptTemplate {
            persona: "You are a helpful Pakistani assistant.",
            focus: "Answer general questions in a friendly way.",
        },
    }
}

/// Render the prompt for `category` with the user's text inserted as-is.
///
/// The text is not escaped or filtered; whatever the user wrote reaches the model inside the
/// `User:` line.
pub fn build_prompt(category: Category, text: &str) -> String {
    let t = template(category);
    format!(
        "{} {}\n{}\n\nUser: {}\n{}",
        t.persona, LENGTH_CONSTRAINT, t.focus, text, LANGUAGE_INSTRUCTION
    )
}

/// Run one turn for `category`: build the prompt, generate once, and return the reply text.
/// A backend failure becomes the reply "<Agent> agent error: <detail>" so the user still hears back.
pub async fn reply_for<B: LlmBackend + ?Sized>(backend: &B, category: Category, text: &str) -> String {
    let prompt = build_prompt(category, text);
    log::debug!("agent: {} prompt via model {}", category, backend.model());
    match backend.generate(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            log::warn!("agent: {} generation failed: {}", category, e);
            format!("{} agent error: {}", category.agent_name(), e)
        }
    }
}
