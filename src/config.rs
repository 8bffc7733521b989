//! Configuration loaded from `glyphforge.toml`.
//!
//! Every value has a sensible default so the file is optional. The
//! `GLYPHFORGE_API_KEY` environment variable takes precedence over the
//! file for the generation API key.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::generate::GenerationParams;
use crate::pipeline::{FontSettings, ToolSpec, DEFAULT_CONCURRENCY};
use crate::retry::RetryPolicy;

pub const CONFIG_FILE: &str = "glyphforge.toml";

/// External tool command templates for the three shelling stages.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "ToolSpec::default_tracer")]
    pub tracer: ToolSpec,
    #[serde(default = "ToolSpec::default_normalizer")]
    pub normalizer: ToolSpec,
    #[serde(default = "ToolSpec::default_compiler")]
    pub compiler: ToolSpec,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tracer: ToolSpec::default_tracer(),
            normalizer: ToolSpec::default_normalizer(),
            compiler: ToolSpec::default_compiler(),
        }
    }
}

/// Generation service endpoint, parameters, and failure policy.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub params: GenerationParams,

    #[serde(default)]
    pub retry: RetryPolicy,

    /// Whether one character exhausting its retry budget aborts the
    /// whole session. When false the glyph is skipped instead.
    #[serde(default = "default_true")]
    pub abort_on_failure: bool,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key: None,
            params: GenerationParams::default(),
            retry: RetryPolicy::default(),
            abort_on_failure: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgeConfig {
    /// Parent directory for per-session workspaces.
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Persistent merged-glyph directory shared across runs.
    #[serde(default = "default_merged_dir")]
    pub merged_dir: PathBuf,

    /// Retain the session workspace after the run, for debugging.
    #[serde(default)]
    pub keep_workspace: bool,

    /// Simultaneous normalizer invocations.
    #[serde(default = "default_normalize_concurrency")]
    pub normalize_concurrency: usize,

    #[serde(default)]
    pub font: FontSettings,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from("workspace")
}

fn default_merged_dir() -> PathBuf {
    PathBuf::from("merged")
}

fn default_normalize_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
            merged_dir: default_merged_dir(),
            keep_workspace: false,
            normalize_concurrency: default_normalize_concurrency(),
            font: FontSettings::default(),
            tools: ToolsConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl ForgeConfig {
    /// Load configuration from the given path, or `glyphforge.toml` in
    /// the current directory. Defaults are used when the file does not
    /// exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or(Path::new(CONFIG_FILE));
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<ForgeConfig>(&contents)?
        } else {
            Self::default()
        };

        // Environment takes precedence over the file for the API key.
        if let Ok(key) = std::env::var("GLYPHFORGE_API_KEY")
            && !key.is_empty()
        {
            config.generation.api_key = Some(key);
        }

        Ok(config)
    }
}
