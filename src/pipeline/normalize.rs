//! Outline canonicalization stage.
//!
//! Each vectorized outline is rewritten by an external tool into a
//! simplified canonical form. Invocations are independent, so they run
//! concurrently under a semaphore. The ceiling exists because the
//! external tool exhausts file descriptors somewhere above 20
//! simultaneous invocations; it is an operational limit and stays
//! configurable. The stage returns only once every submitted file has
//! either succeeded or definitively failed.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::batch::{BatchReport, ItemOutcome};
use super::sorted_files_with_ext;
use super::tool::ToolSpec;
use crate::error::NormalizeError;

pub const DEFAULT_CONCURRENCY: usize = 20;

/// Run `work` over every item with at most `limit` executions in
/// flight. Results are collected in completion order.
pub async fn bounded_for_each<T, R, F, Fut>(limit: usize, items: Vec<T>, work: F) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut set = JoinSet::new();
    for item in items {
        let semaphore = Arc::clone(&semaphore);
        let fut = work(item);
        set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore never closed");
            fut.await
        });
    }

    let mut results = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        results.push(joined.expect("worker task panicked"));
    }
    results
}

pub struct Normalizer {
    tool: ToolSpec,
    concurrency: usize,
}

impl Normalizer {
    pub fn new(tool: ToolSpec, concurrency: usize) -> Self {
        Self { tool, concurrency }
    }

    /// Canonicalize every `.svg` in `input_dir` into `output_dir`,
    /// preserving file names. Per-file failures are recorded and do not
    /// cancel sibling invocations.
    pub async fn run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        progress: Option<&ProgressBar>,
    ) -> Result<BatchReport, NormalizeError> {
        let files = sorted_files_with_ext(input_dir, &["svg"]).map_err(|source| {
            NormalizeError::ReadDir {
                path: input_dir.to_path_buf(),
                source,
            }
        })?;

        if let Some(bar) = progress {
            bar.set_length(files.len() as u64);
        }
        let bar = progress.cloned();

        let jobs: Vec<(String, std::path::PathBuf, std::path::PathBuf)> = files
            .into_iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let dest = output_dir.join(&name);
                (name, path, dest)
            })
            .collect();

        let outcomes = bounded_for_each(self.concurrency, jobs, |(name, src, dest)| {
            let tool = self.tool.clone();
            let bar = bar.clone();
            async move {
                let started = Instant::now();
                let outcome = match tool.run(&src, &dest).await {
                    Ok(()) => ItemOutcome::succeeded(&name, started.elapsed().as_millis() as u64),
                    Err(err) => ItemOutcome::failed(&name, err.to_string()),
                };
                if let Some(bar) = &bar {
                    bar.inc(1);
                }
                outcome
            }
        })
        .await;

        let mut report = BatchReport::new();
        for outcome in outcomes {
            report.push(outcome);
        }
        Ok(report)
    }
}
