use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::types::{GenerationParams, GenerationResponse};
use crate::error::GenerationFailure;

const GENERATE_PATH: &str = "/ai/generate";

/// HTTP client for the external character-generation service.
pub struct GenerationClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GenerationClient {
    /// Create a client for the given base URL. The URL is also used to
    /// resolve relative image references in responses, which makes the
    /// client pointable at a mock server in tests.
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn resolve(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else if reference.starts_with('/') {
            format!("{}{reference}", self.base_url)
        } else {
            format!("{}/{reference}", self.base_url)
        }
    }

    /// One generation attempt: POST the character and reference image,
    /// then fetch the image the API points at. Returns the raw bytes.
    pub async fn generate(
        &self,
        character: char,
        reference_png: &[u8],
        params: &GenerationParams,
    ) -> Result<Vec<u8>, GenerationFailure> {
        let part = Part::bytes(reference_png.to_vec())
            .file_name("reference.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .text("character", character.to_string())
            .text("sampling_step", params.sampling_steps.to_string())
            .text("style_strength", params.style_strength.to_string())
            .part("reference_image", part);

        let mut request = self
            .http
            .post(format!("{}{GENERATE_PATH}", self.base_url))
            .multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenerationFailure::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerationResponse =
            serde_json::from_str(&body).map_err(|e| GenerationFailure::Parse(e.to_string()))?;
        let image_ref = parsed
            .image
            .filter(|r| !r.is_empty())
            .ok_or(GenerationFailure::MissingImage)?;

        let url = self.resolve(&image_ref);
        let download = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GenerationFailure::Download {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        if !download.status().is_success() {
            return Err(GenerationFailure::Download {
                url,
                reason: format!("status {}", download.status()),
            });
        }
        let bytes = download
            .bytes()
            .await
            .map_err(|e| GenerationFailure::Download {
                url,
                reason: e.to_string(),
            })?;
        if bytes.is_empty() {
            return Err(GenerationFailure::EmptyImage);
        }
        Ok(bytes.to_vec())
    }
}
