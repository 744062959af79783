//! `conclave assess`

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::output::{output, CommandOutput};
use crate::cli::table::TableFormatter;
use crate::domain::models::{AggregateAssessment, Config, NotifierKind};
use crate::domain::ports::NotificationOutcome;
use crate::infrastructure::sources::FsTargetSource;
use crate::services::AssessmentPipeline;

#[derive(Args, Debug)]
pub struct AssessArgs {
    /// Files or directories to assess
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Write the JSON report here (overrides report.output_path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Extensions to pick up from directories, comma-separated (overrides catalog.extensions)
    #[arg(short, long, value_delimiter = ',')]
    pub ext: Vec<String>,

    /// Do not send the summary notification
    #[arg(long)]
    pub no_notify: bool,
}

impl AssessArgs {
    /// Fold command-line overrides into `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.output {
            config.report.output_path = Some(path.clone());
        }
        if !self.ext.is_empty() {
            config.catalog.extensions.clone_from(&self.ext);
        }
        if self.no_notify {
            config.notifier.kind = NotifierKind::Disabled;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssessOutput {
    pub assessment: AggregateAssessment,
    pub report_path: Option<PathBuf>,
    pub notification: NotificationOutcome,
    #[serde(skip)]
    summary: String,
}

impl CommandOutput for AssessOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            TableFormatter::new().format_summaries(&self.assessment.persona_summaries),
            String::new(),
            self.summary.clone(),
        ];
        if let Some(path) = &self.report_path {
            lines.push(format!("Report written to {}", path.display()));
        }
        if let Some(error) = &self.notification.error {
            lines.push(format!("Notification not delivered: {error}"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(
    args: AssessArgs,
    mut config: Config,
    cancel: CancellationToken,
    json_mode: bool,
) -> Result<()> {
    args.apply(&mut config);

    let source = FsTargetSource::new(args.paths.clone(), &config.catalog.extensions);
    let pipeline = AssessmentPipeline::builder()
        .config(config)
        .build()
        .context("Invalid assessment configuration")?;

    info!(paths = args.paths.len(), "Starting assessment");
    let result = pipeline
        .run(&source, &cancel)
        .await
        .context("Assessment failed")?;

    if result.assessment.partial {
        warn!("Assessment was cancelled; the report is partial");
    }

    output(
        &AssessOutput {
            assessment: result.assessment,
            report_path: result.report_path,
            notification: result.notification,
            summary: result.report.summary,
        },
        json_mode,
    );
    Ok(())
}
