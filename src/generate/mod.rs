//! Character image generation via the external AI service.

mod client;
mod generator;
pub mod types;

pub use client::GenerationClient;
pub use generator::{CharacterGenerator, GenerationReport};
pub use types::{GenerationParams, GenerationResponse};
