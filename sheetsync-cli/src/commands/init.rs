//! `sheetsync init [--force]`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use sheetsync_core::{settings, AppSettings};

/// Write a default settings file.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Write to this file instead of ~/.sheetsync/settings.yaml.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Overwrite an existing settings file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let (path, home) = match self.settings {
            Some(path) => (path, None),
            None => {
                let home = dirs::home_dir().context("could not determine home directory")?;
                (settings::settings_path_at(&home), Some(home))
            }
        };

        if path.exists() && !self.force {
            bail!(
                "settings file '{}' already exists; pass --force to overwrite",
                path.display()
            );
        }

        let defaults = AppSettings::default();
        match &home {
            Some(home) => settings::save_at(home, &defaults),
            None => settings::save_to(&path, &defaults),
        }
        .with_context(|| format!("failed to write settings to '{}'", path.display()))?;

        println!("{} Wrote default settings", "✓".green());
        println!("  Saved to: {}", path.display());
        println!("  Fill in the credentials, spreadsheet id, attributes and ranges, then run `sheetsync status`.");
        Ok(())
    }
}
