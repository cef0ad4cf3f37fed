//! Score Command
//!
//! Run all five agents over a document and print the report.

use std::path::PathBuf;

use crate::analysis::MissingInfoAnalyzer;
use crate::cli::ui::{Output, print_missing, print_report};
use crate::cli::util::{CommandContext, read_document, subject_from_path};
use crate::scoring::ScoringOrchestrator;
use crate::types::{Result, ScoreError};

pub struct ScoreOptions {
    pub file: PathBuf,
    pub subject: Option<String>,
    pub format: String,
    pub save: bool,
}

pub async fn run(options: ScoreOptions) -> Result<()> {
    let as_json = match options.format.as_str() {
        "json" => true,
        "text" => false,
        other => {
            return Err(ScoreError::InvalidInput(format!(
                "Unknown format '{}'. Valid values: text, json",
                other
            )));
        }
    };

    let text = read_document(&options.file)?;
    let subject = options
        .subject
        .unwrap_or_else(|| subject_from_path(&options.file));

    let ctx = CommandContext::load()?;
    let orchestrator =
        ScoringOrchestrator::from_config(&ctx.config, &ctx.resolver(), ctx.provider()?);

    tracing::info!(
        "Scoring {} ({} chars) as '{}'",
        options.file.display(),
        text.chars().count(),
        subject
    );
    let report = orchestrator.score(&text, &subject).await;

    let scoring_id = if options.save {
        Some(ctx.db.store_scoring(&report)?)
    } else {
        None
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let out = Output::new();
    print_report(&out, &report);
    print_missing(&out, &MissingInfoAnalyzer::new().analyze(&text));

    println!();
    match scoring_id {
        Some(id) => out.success(&format!("Saved scoring {}", id)),
        None => out.info("Not saved (--no-save)"),
    }
    Ok(())
}
