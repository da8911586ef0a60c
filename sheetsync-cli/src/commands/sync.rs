//! `sheetsync sync <channel> --messages <file> --workbook <file>`
//!
//! Runs one channel invocation against a local workbook file.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

use sheetsync_core::OperationResult;
use sheetsync_pipeline::{
    determine_status, ChannelReport, LocalWorkbook, RecordOutcome, SyncAgent, SyncOptions,
    SyncOutcome,
};

use super::load_settings;

/// Arguments for `sheetsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Channel the notifications arrived on (`user:update`, `account:update`).
    pub channel: String,

    /// JSON file holding an array of notifications.
    #[arg(long, value_name = "FILE")]
    pub messages: PathBuf,

    /// Local workbook JSON file to read from and write to.
    #[arg(long, value_name = "FILE")]
    pub workbook: PathBuf,

    /// Settings file (default: ~/.sheetsync/settings.yaml).
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Treat the notifications as a batch import (ignores segments).
    #[arg(long)]
    pub batch: bool,

    /// Show what would be written without touching the workbook.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SyncJson<'a> {
    channel: String,
    #[serde(flatten)]
    outcome: &'a SyncOutcome,
    records: Vec<RecordOutcome>,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "result")]
    result: String,
    #[tabled(rename = "value")]
    value: String,
    #[tabled(rename = "notes")]
    notes: String,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let (_, settings) = load_settings(self.settings.as_deref())?;
        let raw = read_messages(&self.messages)?;
        let client = LocalWorkbook::open(&self.workbook)
            .with_context(|| format!("failed to open workbook '{}'", self.workbook.display()))?;

        let setup_messages = determine_status(&settings).messages;
        let agent = SyncAgent::new(settings, client);
        let options = SyncOptions {
            is_batch: self.batch,
            dry_run: self.dry_run,
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let report = runtime
            .block_on(agent.send_messages(&self.channel, raw, options))
            .with_context(|| format!("sync on channel '{}' failed", self.channel))?;

        if self.json {
            let payload = SyncJson {
                channel: report.channel().to_string(),
                outcome: report.outcome(),
                records: report.records(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
            );
        } else {
            print_report(&report, &setup_messages);
        }

        if let SyncOutcome::WriteFailed { range, error } = report.outcome() {
            bail!("writing {range} failed: {error}");
        }
        Ok(())
    }
}

fn read_messages(path: &Path) -> Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read messages from '{}'", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("'{}' is not valid JSON", path.display()))?;
    match value {
        Value::Array(messages) => Ok(messages),
        _ => Err(anyhow!(
            "'{}' must contain a JSON array of notifications",
            path.display()
        )),
    }
}

fn print_report(report: &ChannelReport, setup_messages: &[String]) {
    match report.outcome() {
        SyncOutcome::SetupIncomplete => {
            println!("{} setup incomplete, nothing processed", "!".yellow());
            for message in setup_messages {
                println!("  {} {message}", "•".bright_black());
            }
        }
        SyncOutcome::NoOp => println!("{} nothing to write", "·".bright_black()),
        SyncOutcome::Written { range, rows } => {
            println!("{} wrote {rows} row(s) to {range}", "✓".green())
        }
        SyncOutcome::WouldWrite { range, rows } => {
            println!("[dry-run] would write {rows} row(s) to {range}")
        }
        SyncOutcome::WriteFailed { range, error } => {
            println!("{} writing {range} failed: {error}", "✗".red())
        }
    }

    println!(
        "{} | {} success | {} skip | {} error | {} pending",
        report.channel(),
        report.count(OperationResult::Success),
        report.count(OperationResult::Skip),
        report.count(OperationResult::Error),
        report.count(OperationResult::Pending),
    );

    let rows: Vec<RecordRow> = report
        .records()
        .into_iter()
        .map(|record| RecordRow {
            id: record.object_id,
            result: result_label(record.result),
            value: record.value.map(|v| cell_text(&v)).unwrap_or_default(),
            notes: record.notes.join("\n"),
        })
        .collect();
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn result_label(result: OperationResult) -> String {
    match result {
        OperationResult::Success => "success".green().to_string(),
        OperationResult::Skip => "skip".bright_black().to_string(),
        OperationResult::Error => "error".red().to_string(),
        OperationResult::Pending => "pending".to_string(),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
