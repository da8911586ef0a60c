//! Connector health derived from the settings alone.
//!
//! Precedence:
//! 1. `SetupRequired` (credentials or spreadsheet id missing)
//! 2. `Warning` (segments configured without attribute / usable range)
//! 3. `Ok`

use std::fmt;

use serde::Serialize;

use sheetsync_core::{AppSettings, ObjectKind, SheetRange};

use crate::notes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectorHealth {
    Ok,
    SetupRequired,
    Warning,
}

impl fmt::Display for ConnectorHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorHealth::Ok => write!(f, "ok"),
            ConnectorHealth::SetupRequired => write!(f, "setupRequired"),
            ConnectorHealth::Warning => write!(f, "warning"),
        }
    }
}

/// Overall status plus one message per problem found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorStatus {
    pub status: ConnectorHealth,
    pub messages: Vec<String>,
}

/// Evaluate the connector's configuration.
///
/// Misconfiguration warnings are only reported once setup is complete.
pub fn determine_status(settings: &AppSettings) -> ConnectorStatus {
    let mut messages = Vec::new();

    let required = [
        (settings.auth_client_email.is_none(), notes::SETUP_REQUIRED_NO_CLIENT_EMAIL),
        (settings.auth_private_key.is_none(), notes::SETUP_REQUIRED_NO_PRIVATE_KEY),
        (settings.auth_private_key_id.is_none(), notes::SETUP_REQUIRED_NO_PRIVATE_KEY_ID),
        (settings.spreadsheet_id.is_none(), notes::SETUP_REQUIRED_NO_SPREADSHEET_ID),
    ];
    for (missing, message) in required {
        if missing {
            messages.push(message.to_string());
        }
    }
    if !messages.is_empty() {
        return ConnectorStatus {
            status: ConnectorHealth::SetupRequired,
            messages,
        };
    }

    for kind in [ObjectKind::Account, ObjectKind::User] {
        let object = settings.for_kind(kind);
        if object.synchronized_segments.is_empty() {
            continue;
        }
        if object.attribute.is_none() {
            messages.push(notes::warning_no_attribute(kind));
        }
        match object.range {
            None => messages.push(notes::warning_no_range(kind)),
            Some(range) => {
                if let Err(err) = SheetRange::parse(range) {
                    messages.push(notes::warning_invalid_range(kind, &err.to_string()));
                }
            }
        }
    }

    let status = if messages.is_empty() {
        ConnectorHealth::Ok
    } else {
        ConnectorHealth::Warning
    };
    ConnectorStatus { status, messages }
}
