pub mod critique;
pub mod json;
pub mod llm_factory;
pub mod llm_provider;
pub mod openai_compatible_provider;
pub mod prompts;

pub use critique::*;
pub use json::{extract_json_object, parse_reply};
pub use llm_factory::LLMProviderFactory;
pub use llm_provider::*;
pub use openai_compatible_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};
