//! Drives one session through the full pipeline.
//!
//! Stages run strictly in sequence: each consumes the complete,
//! fully-materialized output of its predecessor. The orchestrator owns
//! the session workspace and tears it down in exactly one place,
//! whether the pipeline succeeded or failed.

use std::path::{Path, PathBuf};

use crate::config::ForgeConfig;
use crate::error::PipelineError;
use crate::generate::{CharacterGenerator, GenerationClient};
use crate::pipeline::{
    compose_font, merge_new_files, FontCompiler, Normalizer, Vectorizer,
};
use crate::session::{PipelineCounts, Session, SessionReport, SessionState, SessionStatus};
use crate::ui::PipelineProgress;
use crate::workspace::Workspace;

const FONT_DOCUMENT: &str = "font.svg";
const FONT_BINARY: &str = "font.ttf";

/// Where a session's glyph sources come from.
#[derive(Debug, Clone)]
pub enum JobInput {
    /// Pre-existing raster images in a directory.
    Rasters { input_dir: PathBuf },
    /// Characters to synthesize from a reference style image first.
    Characters {
        text: String,
        reference_image: PathBuf,
    },
}

pub struct PipelineOrchestrator {
    config: ForgeConfig,
    progress: Option<PipelineProgress>,
}

impl PipelineOrchestrator {
    pub fn new(config: ForgeConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    pub fn with_progress(config: ForgeConfig, progress: PipelineProgress) -> Self {
        Self {
            config,
            progress: Some(progress),
        }
    }

    pub fn progress(&self) -> Option<&PipelineProgress> {
        self.progress.as_ref()
    }

    /// Run a session end to end and return its report. The workspace is
    /// destroyed on both success and failure paths (unless retention is
    /// configured); a stage failure is recorded with the failing stage
    /// and cause rather than returned as a bare error, so the caller
    /// always gets the full audit trail.
    pub async fn run(
        &self,
        session: &mut Session,
        input: &JobInput,
        output: &Path,
    ) -> SessionReport {
        session.status = SessionStatus::InProgress;
        let mut counts = PipelineCounts::default();
        let mut destroy_calls = 0;

        let result = match Workspace::create(&self.config.workspace_root, &session.id) {
            Ok(mut workspace) => {
                let result = self
                    .run_stages(session, &workspace, input, output, &mut counts)
                    .await;
                if self.config.keep_workspace {
                    eprintln!("  workspace retained at {}", workspace.root().display());
                } else if let Err(teardown) = workspace.destroy() {
                    // The stage result is the interesting failure; a
                    // teardown error must not mask it.
                    eprintln!("  workspace teardown failed: {teardown}");
                }
                destroy_calls = workspace.destroy_calls();
                result
            }
            Err(err) => Err(PipelineError::Workspace(err)),
        };

        let delivered = match result {
            Ok(path) => Some(path),
            Err(err) => {
                session.fail(err.stage(), err.to_string());
                None
            }
        };
        SessionReport::from_session(session, counts, delivered, destroy_calls)
    }

    fn note_stage(&self, state: SessionState) {
        if let Some(progress) = &self.progress {
            progress.stage(state);
        }
    }

    async fn run_stages(
        &self,
        session: &mut Session,
        workspace: &Workspace,
        input: &JobInput,
        output: &Path,
        counts: &mut PipelineCounts,
    ) -> Result<PathBuf, PipelineError> {
        // STAGING
        self.note_stage(session.advance());
        match input {
            JobInput::Rasters { input_dir } => {
                counts.staged = workspace.stage_inputs(input_dir)?;
            }
            JobInput::Characters {
                text,
                reference_image,
            } => {
                let client = GenerationClient::new(
                    self.config.generation.api_base_url.clone(),
                    self.config.generation.api_key.clone(),
                );
                let generator = CharacterGenerator::new(
                    client,
                    self.config.generation.retry.clone(),
                    self.config.generation.params.clone(),
                );
                let report = generator
                    .generate_all(
                        text,
                        reference_image,
                        &workspace.raw_dir(),
                        self.config.generation.abort_on_failure,
                    )
                    .await?;
                counts.generated = report.generated.len();
                counts.generation_skipped = report.skipped.len();
                counts.staged = report.generated.len();
                for (character, cause) in &report.skipped {
                    eprintln!("  skipped '{character}': {cause}");
                }
            }
        }

        // VECTORIZING
        self.note_stage(session.advance());
        let bar = self.progress.as_ref().map(|p| p.stage_bar("vectorize"));
        let vectorized = Vectorizer::new(self.config.tools.tracer.clone())
            .run(&workspace.raw_dir(), &workspace.vectorized_dir(), bar.as_ref())
            .await?;
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        if let Some(progress) = &self.progress {
            progress.batch_summary(SessionState::Vectorizing, &vectorized);
        }
        counts.vectorized = vectorized.succeeded();
        counts.vectorize_failed = vectorized.failed();

        // NORMALIZING
        self.note_stage(session.advance());
        let bar = self.progress.as_ref().map(|p| p.stage_bar("normalize"));
        let normalized = Normalizer::new(
            self.config.tools.normalizer.clone(),
            self.config.normalize_concurrency,
        )
        .run(
            &workspace.vectorized_dir(),
            &workspace.normalized_dir(),
            bar.as_ref(),
        )
        .await?;
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        if let Some(progress) = &self.progress {
            progress.batch_summary(SessionState::Normalizing, &normalized);
        }
        counts.normalized = normalized.succeeded();
        counts.normalize_failed = normalized.failed();

        // MERGING
        self.note_stage(session.advance());
        let merged = merge_new_files(&workspace.normalized_dir(), &self.config.merged_dir)?;
        for (name, cause) in &merged.failed {
            eprintln!("  merge skipped {name}: {cause}");
        }
        counts.merged = merged.copied.len();
        counts.merge_skipped = merged.skipped.len();
        counts.merge_failed = merged.failed.len();

        // COMPOSING
        self.note_stage(session.advance());
        let font_doc = workspace.final_dir().join(FONT_DOCUMENT);
        let composed = compose_font(&self.config.merged_dir, &font_doc, &self.config.font)?;
        counts.glyphs_composed = composed.code_points.len();

        // COMPILING
        self.note_stage(session.advance());
        let font_bin = workspace.final_dir().join(FONT_BINARY);
        FontCompiler::new(self.config.tools.compiler.clone())
            .run(&font_doc, &font_bin)
            .await?;

        // Deliver outside the workspace before teardown removes it.
        std::fs::copy(&font_bin, output).map_err(|source| PipelineError::Deliver {
            path: output.to_path_buf(),
            source,
        })?;

        session.advance(); // → Done
        Ok(output.to_path_buf())
    }
}
