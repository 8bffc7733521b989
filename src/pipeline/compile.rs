//! Binary font compilation adapter.
//!
//! Hands the composed font document to an external compiler and treats
//! any abnormal termination as fatal. Compilation is deterministic for
//! a fixed input, so there is no retry.

use std::path::Path;

use super::tool::ToolSpec;
use crate::error::{CompileError, ToolError};

pub struct FontCompiler {
    tool: ToolSpec,
}

impl FontCompiler {
    pub fn new(tool: ToolSpec) -> Self {
        Self { tool }
    }

    /// Compile `font_doc` into a binary font at `out_path`. The output
    /// must exist and be non-empty afterwards.
    pub async fn run(&self, font_doc: &Path, out_path: &Path) -> Result<(), CompileError> {
        self.tool.run(font_doc, out_path).await.map_err(|err| match err {
            ToolError::Spawn { program, source } => CompileError::Spawn { program, source },
            ToolError::Failed { status, stderr, .. } => CompileError::Failed { status, stderr },
            ToolError::WriteOutput { path, source } => CompileError::Spawn {
                program: format!("write {}", path.display()),
                source,
            },
        })?;

        let meta = std::fs::metadata(out_path)
            .map_err(|_| CompileError::MissingOutput(out_path.to_path_buf()))?;
        if meta.len() == 0 {
            return Err(CompileError::EmptyOutput(out_path.to_path_buf()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn compiles_via_external_tool() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("font.svg");
        let out = tmp.path().join("font.ttf");
        fs::write(&doc, "<svg>font</svg>").unwrap();

        // "cp" stands in for the compiler.
        let compiler = FontCompiler::new(ToolSpec::new("cp", &["{input}", "{output}"]));
        compiler.run(&doc, &out).await.unwrap();
        assert!(out.is_file());
    }

    #[tokio::test]
    async fn non_zero_exit_is_fatal_with_diagnostics() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("font.svg");
        fs::write(&doc, "<svg/>").unwrap();

        let compiler = FontCompiler::new(ToolSpec::new(
            "sh",
            &["-c", "echo 'bad font document' >&2; exit 3"],
        ));
        let err = compiler
            .run(&doc, &tmp.path().join("font.ttf"))
            .await
            .unwrap_err();

        match err {
            CompileError::Failed { stderr, .. } => {
                assert!(stderr.contains("bad font document"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_output_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("font.svg");
        fs::write(&doc, "<svg/>").unwrap();

        // Exits 0 but never writes the output file. The {output}
        // placeholder keeps ToolSpec from capturing stdout.
        let compiler = FontCompiler::new(ToolSpec::new("sh", &["-c", "true # {output}"]));
        let err = compiler
            .run(&doc, &tmp.path().join("font.ttf"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::MissingOutput(_)));
    }

    #[tokio::test]
    async fn empty_output_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("font.svg");
        fs::write(&doc, "<svg/>").unwrap();

        let compiler = FontCompiler::new(ToolSpec::new("sh", &["-c", "touch {output}"]));
        let err = compiler
            .run(&doc, &tmp.path().join("font.ttf"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::EmptyOutput(_)));
    }
}
