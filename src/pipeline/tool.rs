//! External tool invocation.
//!
//! Every tracing, normalization, and compilation step shells out to an
//! external tool. The literal command line is configuration, not code:
//! a [`ToolSpec`] is a program plus an argument template with `{input}`
//! and `{output}` placeholders. Tools that print the result on stdout
//! instead of taking an output path simply omit `{output}` from the
//! template and the captured stdout is written to the output file.

use std::path::Path;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::ToolError;

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// A configurable external command template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Default raster tracer (potrace with the SVG backend).
    pub fn default_tracer() -> Self {
        Self::new("potrace", &["--svg", INPUT_PLACEHOLDER, "-o", OUTPUT_PLACEHOLDER])
    }

    /// Default outline normalizer (picosvg prints the simplified SVG on
    /// stdout).
    pub fn default_normalizer() -> Self {
        Self::new("picosvg", &[INPUT_PLACEHOLDER])
    }

    /// Default font compiler (FontForge driven by an inline ff script).
    pub fn default_compiler() -> Self {
        Self::new(
            "fontforge",
            &[
                "-lang=ff",
                "-c",
                "Open(\"{input}\"); Generate(\"{output}\"); Quit();",
            ],
        )
    }

    fn writes_output_itself(&self) -> bool {
        self.args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER))
    }

    /// Run the tool for one input/output pair. Non-zero exit is an
    /// error carrying the tool's stderr.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let input_str = input.to_string_lossy();
        let output_str = output.to_string_lossy();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, &input_str)
                    .replace(OUTPUT_PLACEHOLDER, &output_str)
            })
            .collect();

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(ToolError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        if !self.writes_output_itself() {
            tokio::fs::write(output, &result.stdout)
                .await
                .map_err(|source| ToolError::WriteOutput {
                    path: output.to_path_buf(),
                    source,
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn tool_with_output_placeholder_writes_file() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in.txt");
        let output = tmp.path().join("out.txt");
        std::fs::write(&input, "outline").unwrap();

        let tool = ToolSpec::new("cp", &["{input}", "{output}"]);
        tool.run(&input, &output).await.unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "outline");
    }

    #[tokio::test]
    async fn tool_without_output_placeholder_captures_stdout() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in.svg");
        let output = tmp.path().join("out.svg");
        std::fs::write(&input, "<svg/>").unwrap();

        let tool = ToolSpec::new("cat", &["{input}"]);
        tool.run(&input, &output).await.unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "<svg/>");
    }

    #[tokio::test]
    async fn non_zero_exit_reports_failure() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("missing.svg");
        let output = tmp.path().join("out.svg");

        let tool = ToolSpec::new("cat", &["{input}"]);
        let err = tool.run(&input, &output).await.unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));
    }

    #[tokio::test]
    async fn unknown_program_reports_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let tool = ToolSpec::new("glyphforge-no-such-tool", &["{input}"]);
        let err = tool
            .run(&tmp.path().join("a"), &tmp.path().join("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }
}
