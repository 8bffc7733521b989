use serde::{Deserialize, Serialize};

/// Numeric parameters forwarded to the generation API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Diffusion sampling steps.
    #[serde(default = "default_sampling_steps")]
    pub sampling_steps: u32,
    /// How strongly the reference style is applied.
    #[serde(default = "default_style_strength")]
    pub style_strength: f32,
}

fn default_sampling_steps() -> u32 {
    20
}

fn default_style_strength() -> f32 {
    1.0
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            sampling_steps: default_sampling_steps(),
            style_strength: default_style_strength(),
        }
    }
}

/// JSON body returned by the generation endpoint. The `image` field is
/// a reference to the generated image, fetched in a second request.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
