//! CLI runner - executes an export

use crate::auth::{CredentialSet, SessionBuilder};
use crate::cli::commands::Cli;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::normalize::ResultSet;
use crate::output::export_records;
use crate::pagination::{Outcome, PaginationEngine, RunReport, StopReason};
use crate::types::OutputFormat;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// What one export produced
#[derive(Debug)]
pub struct ExportSummary {
    pub report: RunReport,
    /// Exported file; `None` when nothing was collected
    pub output: Option<PathBuf>,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the export and print a summary. A failed run is returned as an
    /// error after its partial results have been written.
    pub async fn run(&self) -> Result<()> {
        let summary = self.execute().await?;
        Self::print_summary(&summary);

        match summary.report.outcome {
            Outcome::Failed(e) => Err(e),
            Outcome::Done(_) => Ok(()),
        }
    }

    /// Fetch, normalize and export without touching stdout
    pub async fn execute(&self) -> Result<ExportSummary> {
        let credentials = CredentialSet::from_file(&self.cli.cookies)?;
        debug!("Loaded {} cookies", credentials.len());

        let config = self.load_config()?;
        let session = SessionBuilder::new(&config).build(&credentials)?;
        let engine = PaginationEngine::new(session, &config)?;

        let mut results = ResultSet::new();
        let report = engine.run(&mut results).await;

        let format = OutputFormat::from(self.cli.format);
        let output = match export_records(&results, &self.cli.output_dir, format) {
            Ok(output) => output,
            Err(e) => {
                if let Some(run_error) = report.error() {
                    error!("Pagination had already stopped: {run_error}");
                }
                error!(
                    "Could not export {} collected bookmarks: {e}",
                    results.len()
                );
                return Err(e);
            }
        };
        if output.is_none() {
            info!("No bookmarks collected, nothing exported");
        }

        Ok(ExportSummary { report, output })
    }

    /// Defaults, then the config file, then command-line overrides
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(max_pages) = self.cli.max_pages {
            config.max_pages = max_pages;
        }

        config.validate()?;
        Ok(config)
    }

    fn print_summary(summary: &ExportSummary) {
        let report = &summary.report;
        println!(
            "Fetched {} pages, {} bookmarks in {:.1}s",
            report.pages,
            report.records,
            report.duration.as_secs_f64()
        );
        if report.dropped > 0 {
            println!("Skipped {} unreadable items", report.dropped);
        }
        if report.unavailable > 0 {
            println!("Skipped {} deleted or unavailable posts", report.unavailable);
        }

        match report.stop_reason() {
            Some(StopReason::MaxPagesReached) => println!("Stopped at the page limit"),
            Some(StopReason::Exhausted) | None => {}
        }

        match &summary.output {
            Some(path) => println!("Saved to {}", path.display()),
            None => println!("No bookmarks to export"),
        }

        if let Some(e) = report.error() {
            eprintln!("Export incomplete: {e}");
        }
    }
}
