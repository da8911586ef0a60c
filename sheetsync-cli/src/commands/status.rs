//! `sheetsync status`: connector health.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use sheetsync_core::{AppSettings, ObjectKind};
use sheetsync_pipeline::{determine_status, ConnectorHealth, ConnectorStatus};

use super::load_settings;

/// Arguments for `sheetsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Settings file (default: ~/.sheetsync/settings.yaml).
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    settings: String,
    #[serde(flatten)]
    status: &'a ConnectorStatus,
}

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "object")]
    kind: String,
    #[tabled(rename = "segments")]
    segments: usize,
    #[tabled(rename = "attribute")]
    attribute: String,
    #[tabled(rename = "range")]
    range: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let (path, settings) = load_settings(self.settings.as_deref())?;
        let status = determine_status(&settings);

        if self.json {
            let payload = StatusJson {
                settings: path.display().to_string(),
                status: &status,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        println!(
            "sheetsync v{} | {} | {}",
            env!("CARGO_PKG_VERSION"),
            health_label(status.status),
            path.display()
        );
        print_objects(&settings);
        for message in &status.messages {
            println!("  {} {message}", "•".bright_black());
        }
        Ok(())
    }
}

fn health_label(health: ConnectorHealth) -> String {
    match health {
        ConnectorHealth::Ok => "OK".green().bold().to_string(),
        ConnectorHealth::SetupRequired => "SETUP REQUIRED".red().bold().to_string(),
        ConnectorHealth::Warning => "WARNING".yellow().bold().to_string(),
    }
}

fn print_objects(settings: &AppSettings) {
    let rows: Vec<ObjectRow> = [ObjectKind::User, ObjectKind::Account]
        .into_iter()
        .map(|kind| {
            let object = settings.for_kind(kind);
            ObjectRow {
                kind: kind.to_string(),
                segments: object.synchronized_segments.len(),
                attribute: object.attribute.unwrap_or("-").to_string(),
                range: object.range.unwrap_or("-").to_string(),
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
