//! Pipeline stages: trace, normalize, merge, compose, compile.

pub mod batch;
pub mod compile;
pub mod compose;
pub mod merge;
pub mod normalize;
pub mod tool;
pub mod vectorize;

pub use batch::{BatchReport, ItemOutcome};
pub use compile::FontCompiler;
pub use compose::{compose_font, extract_code_point, ComposeReport, FontSettings};
pub use merge::{merge_new_files, MergeReport};
pub use normalize::{bounded_for_each, Normalizer, DEFAULT_CONCURRENCY};
pub use tool::ToolSpec;
pub use vectorize::Vectorizer;

use std::path::{Path, PathBuf};

/// Plain files in `dir` with one of the given extensions
/// (case-insensitive), sorted by name for deterministic batch order.
pub(crate) fn sorted_files_with_ext(
    dir: &Path,
    exts: &[&str],
) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension().is_some_and(|ext| {
                    exts.iter().any(|want| ext.eq_ignore_ascii_case(want))
                })
        })
        .collect();
    files.sort();
    Ok(files)
}
