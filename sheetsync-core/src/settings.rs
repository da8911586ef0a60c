//! Connector settings and their YAML persistence.
//!
//! # Storage layout
//!
//! ```text
//! ~/.sheetsync/
//!   settings.yaml   (mode 0600)
//! ```
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)`: explicit home; the CLI passes `dirs::home_dir()`
//!   and tests pass a `TempDir`
//! - `fn_to` / `fn_from`: an explicit settings file (`--settings`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, SettingsError};
use crate::types::{ObjectKind, SegmentId};

/// Connector settings, owned by the configuration system and read-only to
/// the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub user_synchronized_segments: Vec<SegmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_attribute: Option<String>,

    #[serde(default)]
    pub account_synchronized_segments: Vec<SegmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_attribute: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_client_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_private_key_id: Option<String>,
}

/// The slice of [`AppSettings`] that applies to one object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSettings<'a> {
    pub synchronized_segments: &'a [SegmentId],
    pub attribute: Option<&'a str>,
    pub range: Option<&'a str>,
}

impl AppSettings {
    /// Per-kind view. Events carry no sync configuration.
    pub fn for_kind(&self, kind: ObjectKind) -> ObjectSettings<'_> {
        match kind {
            ObjectKind::User => ObjectSettings {
                synchronized_segments: &self.user_synchronized_segments,
                attribute: configured(&self.user_attribute),
                range: configured(&self.user_range),
            },
            ObjectKind::Account => ObjectSettings {
                synchronized_segments: &self.account_synchronized_segments,
                attribute: configured(&self.account_attribute),
                range: configured(&self.account_range),
            },
            ObjectKind::Event => ObjectSettings {
                synchronized_segments: &[],
                attribute: None,
                range: None,
            },
        }
    }

    /// Credentials and a target spreadsheet are all present.
    pub fn is_setup_complete(&self) -> bool {
        self.auth_client_email.is_some()
            && self.auth_private_key.is_some()
            && self.auth_private_key_id.is_some()
            && self.spreadsheet_id.is_some()
    }
}

/// Blank strings coming from a settings form mean "not configured".
fn configured(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// `<home>/.sheetsync/settings.yaml`: pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".sheetsync").join("settings.yaml")
}

/// Load settings from an explicit file path.
pub fn load_from(path: &Path) -> Result<AppSettings, SettingsError> {
    if !path.exists() {
        return Err(SettingsError::SettingsNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `<home>/.sheetsync/settings.yaml`.
pub fn load_at(home: &Path) -> Result<AppSettings, SettingsError> {
    load_from(&settings_path_at(home))
}

/// Save settings to an explicit file path atomically (`.tmp` + rename).
pub fn save_to(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }

    let yaml = serde_yaml::to_string(settings)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Save `<home>/.sheetsync/settings.yaml`.
pub fn save_at(home: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    save_to(&settings_path_at(home), settings)
}

// Settings hold a private key.
#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), SettingsError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), SettingsError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
