mod cli;
mod config;
mod error;
mod generate;
mod orchestrator;
mod pipeline;
mod retry;
mod session;
mod ui;
mod workspace;

use anyhow::bail;
use clap::Parser;

use cli::{Cli, Command};
use config::ForgeConfig;
use orchestrator::{JobInput, PipelineOrchestrator};
use session::Session;
use ui::PipelineProgress;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ForgeConfig::load(cli.config.as_deref())?;
    if cli.keep_workspace {
        config.keep_workspace = true;
    }
    if let Some(concurrency) = cli.concurrency {
        config.normalize_concurrency = concurrency;
    }

    let (input, output) = match cli.command {
        Command::Convert { input, output } => (JobInput::Rasters { input_dir: input }, output),
        Command::Generate {
            characters,
            reference,
            output,
            skip_failed,
        } => {
            if skip_failed {
                config.generation.abort_on_failure = false;
            }
            (
                JobInput::Characters {
                    text: characters,
                    reference_image: reference,
                },
                output,
            )
        }
    };

    let mut session = Session::new();
    let progress = PipelineProgress::start(&session.id);
    let orchestrator = PipelineOrchestrator::with_progress(config, progress);

    let report = orchestrator.run(&mut session, &input, &output).await;

    if let Some(progress) = orchestrator.progress() {
        progress.complete(&report);
        if cli.verbose {
            progress.print_report(&report);
        }
    }

    if !report.is_success() {
        match &report.failure {
            Some(failure) => bail!("{} stage failed: {}", failure.stage, failure.cause),
            None => bail!("session failed"),
        }
    }
    Ok(())
}
