//! Command-line interface, built on clap.
//!
//! Two subcommands: `convert` runs the pipeline over existing raster
//! images, `generate` synthesizes missing character images first.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// glyphforge — turn glyph images into a font.
#[derive(Debug, Parser)]
#[command(name = "glyphforge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file (default: glyphforge.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Retain the session workspace after the run, for debugging.
    #[arg(long, global = true, default_value_t = false)]
    pub keep_workspace: bool,

    /// Simultaneous normalizer invocations.
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Print the full session report.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a directory of glyph raster images into a font.
    Convert {
        /// Directory of raster images named u+<hex>.<ext>.
        input: PathBuf,

        /// Where to write the compiled font.
        #[arg(short, long, default_value = "font.ttf")]
        output: PathBuf,
    },

    /// Generate glyph images for the given characters, then convert.
    Generate {
        /// Characters to generate glyphs for.
        characters: String,

        /// Reference style image (PNG).
        #[arg(short, long)]
        reference: PathBuf,

        /// Where to write the compiled font.
        #[arg(short, long, default_value = "font.ttf")]
        output: PathBuf,

        /// Skip characters whose generation fails instead of aborting
        /// the session.
        #[arg(long, default_value_t = false)]
        skip_failed: bool,
    },
}
