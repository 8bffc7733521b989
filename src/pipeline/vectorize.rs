//! Raster-to-outline tracing stage.
//!
//! Tracing is CPU-bound in the external tool, so the batch runs
//! sequentially. A failed trace is recorded against its source file and
//! the batch continues; the stage only fails outright when the input
//! directory itself cannot be read.

use std::path::Path;
use std::time::Instant;

use indicatif::ProgressBar;

use super::batch::{BatchReport, ItemOutcome};
use super::sorted_files_with_ext;
use super::tool::ToolSpec;
use crate::error::VectorizeError;

/// Raster extensions accepted as glyph sources.
const RASTER_EXTS: &[&str] = &["png", "bmp", "pnm", "jpg", "jpeg"];

pub struct Vectorizer {
    tool: ToolSpec,
}

impl Vectorizer {
    pub fn new(tool: ToolSpec) -> Self {
        Self { tool }
    }

    /// Trace every raster in `input_dir` into an `.svg` next to its
    /// stem under `output_dir`. Returns one outcome per input file.
    pub async fn run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        progress: Option<&ProgressBar>,
    ) -> Result<BatchReport, VectorizeError> {
        let files = sorted_files_with_ext(input_dir, RASTER_EXTS).map_err(|source| {
            VectorizeError::ReadDir {
                path: input_dir.to_path_buf(),
                source,
            }
        })?;

        if let Some(bar) = progress {
            bar.set_length(files.len() as u64);
        }

        let mut report = BatchReport::new();
        for path in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let dest = output_dir.join(format!("{stem}.svg"));

            let started = Instant::now();
            let outcome = match self.tool.run(&path, &dest).await {
                Ok(()) => ItemOutcome::succeeded(&name, started.elapsed().as_millis() as u64),
                Err(err) => ItemOutcome::failed(&name, err.to_string()),
            };
            report.push(outcome);

            if let Some(bar) = progress {
                bar.inc(1);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // "cp" stands in for the tracer so tests do not depend on potrace.
    fn fake_tracer() -> ToolSpec {
        ToolSpec::new("cp", &["{input}", "{output}"])
    }

    #[tokio::test]
    async fn traces_every_raster_preserving_stems() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("raw");
        let output = tmp.path().join("vectorized");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        fs::write(input.join("u+4e00.png"), b"raster").unwrap();
        fs::write(input.join("u+4e8c.png"), b"raster").unwrap();
        fs::write(input.join("notes.txt"), b"not a raster").unwrap();

        let report = Vectorizer::new(fake_tracer())
            .run(&input, &output, None)
            .await
            .unwrap();

        assert_eq!(report.total(), 2);
        assert_eq!(report.succeeded(), 2);
        assert!(output.join("u+4e00.svg").is_file());
        assert!(output.join("u+4e8c.svg").is_file());
        assert!(!output.join("notes.svg").exists());
    }

    #[tokio::test]
    async fn per_file_failure_does_not_abort_batch() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("raw");
        let output = tmp.path().join("vectorized");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        fs::write(input.join("a.png"), b"x").unwrap();
        fs::write(input.join("b.png"), b"x").unwrap();

        // Tracer that fails on every file.
        let report = Vectorizer::new(ToolSpec::new("false", &["{input}", "{output}"]))
            .run(&input, &output, None)
            .await
            .unwrap();

        assert_eq!(report.total(), 2);
        assert_eq!(report.failed(), 2);
        let names: Vec<_> = report.failures().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[tokio::test]
    async fn output_count_never_exceeds_input_count() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("raw");
        let output = tmp.path().join("vectorized");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        for i in 0..5 {
            fs::write(input.join(format!("g{i}.png")), b"x").unwrap();
        }

        let report = Vectorizer::new(fake_tracer())
            .run(&input, &output, None)
            .await
            .unwrap();

        let produced = fs::read_dir(&output).unwrap().count();
        assert!(produced <= report.total());
        assert_eq!(report.total(), 5);
    }

    #[tokio::test]
    async fn missing_input_dir_is_a_stage_error() {
        let tmp = TempDir::new().unwrap();
        let err = Vectorizer::new(fake_tracer())
            .run(&tmp.path().join("absent"), tmp.path(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, VectorizeError::ReadDir { .. }));
    }
}
