//! Terminal progress output — spinner, per-stage bars, colored summaries.
//!
//! Uses `indicatif` for the spinner/progress bars and `console` for
//! styling. [`PipelineProgress`] tracks one session visually.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::BatchReport;
use crate::session::{SessionReport, SessionState, SessionStatus};

/// Visual progress for one pipeline session.
pub struct PipelineProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl PipelineProgress {
    /// Start the spinner for a new session.
    pub fn start(session_id: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("CREATED: session {session_id}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Update the spinner to reflect the stage being entered.
    pub fn stage(&self, state: SessionState) {
        self.pb.set_message(format!("{state}"));
    }

    /// Bar for a batch stage; length is set by the stage once it knows
    /// the file count.
    pub fn stage_bar(&self, label: &str) -> ProgressBar {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {msg} [{bar:40}] {pos}/{len}")
                .expect("invalid template"),
        );
        bar.set_message(label.to_string());
        bar
    }

    /// Print an end-of-batch summary for one stage.
    pub fn batch_summary(&self, stage: SessionState, report: &BatchReport) {
        let style = if report.failed() == 0 {
            &self.green
        } else {
            &self.yellow
        };
        self.pb.println(format!(
            "  {} {stage}: {}",
            style.apply_to("•"),
            report.summary()
        ));
        for (name, cause) in report.failures() {
            self.pb
                .println(format!("    {} {name}: {cause}", self.yellow.apply_to("!")));
        }
    }

    /// Finish the spinner and show the terminal result.
    pub fn complete(&self, report: &SessionReport) {
        self.pb.finish_and_clear();
        match report.status {
            SessionStatus::Completed => {
                println!(
                    "  {} Font written to {}",
                    self.green.apply_to("✓"),
                    report
                        .output
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                );
            }
            _ => {
                let failure = report
                    .failure
                    .as_ref()
                    .map(|f| format!("{} stage: {}", f.stage, f.cause))
                    .unwrap_or_else(|| "unknown failure".to_string());
                println!("  {} Session failed — {failure}", self.red.apply_to("✗"));
            }
        }
    }

    /// Print the full session report as JSON.
    pub fn print_report(&self, report: &SessionReport) {
        let status_style = match report.status {
            SessionStatus::Completed => &self.green,
            SessionStatus::Failed => &self.red,
            _ => &self.yellow,
        };
        println!();
        println!("{}", status_style.apply_to("─── Session Report ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    }
}
