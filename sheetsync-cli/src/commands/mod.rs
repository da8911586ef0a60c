pub mod init;
pub mod range;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use sheetsync_core::{settings, AppSettings};

/// Settings from `--settings` if given, else `~/.sheetsync/settings.yaml`.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<(PathBuf, AppSettings)> {
    let (path, loaded) = match path {
        Some(p) => (p.to_path_buf(), settings::load_from(p)),
        None => {
            let home = dirs::home_dir().context("could not determine home directory")?;
            (settings::settings_path_at(&home), settings::load_at(&home))
        }
    };
    let loaded = loaded.with_context(|| {
        format!(
            "failed to load settings from '{}'; run `sheetsync init` first",
            path.display()
        )
    })?;
    tracing::debug!(path = %path.display(), "settings loaded");
    Ok((path, loaded))
}
