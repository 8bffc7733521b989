//! Per-character generation with retry.
//!
//! Each requested character is one generation request: attempted up to
//! the policy's budget, with the constant pre-request delay and
//! exponential backoff between failures. A character that exhausts its
//! budget fails terminally; whether that aborts the whole batch or
//! skips the glyph is the caller's policy.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::client::GenerationClient;
use super::types::GenerationParams;
use crate::error::{GenerationError, GenerationFailure};
use crate::retry::RetryPolicy;

/// Outcome of generating a batch of characters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Images staged into the raw directory.
    pub generated: Vec<PathBuf>,
    /// Characters skipped after exhausting their retry budget, with
    /// the terminal cause. Only populated when the skip policy is in
    /// effect.
    pub skipped: Vec<(char, String)>,
}

pub struct CharacterGenerator {
    client: GenerationClient,
    retry: RetryPolicy,
    params: GenerationParams,
}

impl CharacterGenerator {
    pub fn new(client: GenerationClient, retry: RetryPolicy, params: GenerationParams) -> Self {
        Self {
            client,
            retry,
            params,
        }
    }

    /// Generate one character image and stage it as pipeline input,
    /// named by the character's code point.
    pub async fn generate_into(
        &self,
        character: char,
        reference_png: &[u8],
        raw_dir: &Path,
    ) -> Result<PathBuf, GenerationError> {
        let dest = raw_dir.join(format!("u+{:04x}.png", character as u32));

        let bytes = self
            .retry
            .run(|_attempt| self.client.generate(character, reference_png, &self.params))
            .await
            .map_err(|last| GenerationError {
                character,
                attempts: self.retry.max_attempts.max(1),
                last,
            })?;

        std::fs::write(&dest, &bytes).map_err(|source| GenerationError {
            character,
            attempts: self.retry.max_attempts.max(1),
            last: GenerationFailure::Save {
                path: dest.clone(),
                source,
            },
        })?;
        Ok(dest)
    }

    /// Generate every character in `characters` from the given
    /// reference style image. With `abort_on_failure`, the first
    /// exhausted character aborts the batch; otherwise it is recorded
    /// as skipped and the batch continues.
    pub async fn generate_all(
        &self,
        characters: &str,
        reference_image: &Path,
        raw_dir: &Path,
        abort_on_failure: bool,
    ) -> Result<GenerationReport, GenerationError> {
        let reference_png = read_reference(reference_image).map_err(|failure| GenerationError {
            character: characters.chars().next().unwrap_or('\u{fffd}'),
            attempts: 0,
            last: failure,
        })?;

        let mut report = GenerationReport::default();
        for character in characters.chars() {
            match self
                .generate_into(character, &reference_png, raw_dir)
                .await
            {
                Ok(path) => report.generated.push(path),
                Err(err) if abort_on_failure => return Err(err),
                Err(err) => report.skipped.push((character, err.to_string())),
            }
        }
        Ok(report)
    }
}

fn read_reference(path: &Path) -> Result<Vec<u8>, GenerationFailure> {
    let bytes = std::fs::read(path).map_err(|e| GenerationFailure::Reference {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if bytes.is_empty() {
        return Err(GenerationFailure::Reference {
            path: path.to_path_buf(),
            reason: "file is empty".into(),
        });
    }
    Ok(bytes)
}
