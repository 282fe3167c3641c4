// Suggestion generation: turns violated criteria into an LLM prompt and relays the raw output.
// All LLM calls go through llm_client::TextGenerator.

pub mod generator;
pub mod handlers;
pub mod prompts;
