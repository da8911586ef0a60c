//! Human-readable texts attached to skipped envelopes and status reports.

use sheetsync_core::ObjectKind;

pub fn not_in_any_segment(kind: ObjectKind) -> String {
    format!("The {kind} won't be synchronized since it is not matching any of the synchronized segments.")
}

pub fn no_attribute_configured(kind: ObjectKind) -> String {
    format!(
        "The {kind} won't be synchronized since there is no attribute configured. Please check your settings."
    )
}

pub fn no_value_for_attribute(kind: ObjectKind, attribute: &str) -> String {
    format!("The {kind} won't be synchronized since it has no value for mandatory attribute '{attribute}'.")
}

pub fn already_in_sheet(kind: ObjectKind) -> String {
    format!("The {kind} won't be synchronized since the data is already present in the spreadsheet.")
}

pub fn no_range_configured(kind: ObjectKind) -> String {
    format!("The {kind} won't be synchronized since there is no range configured. Please check your settings.")
}

pub const SETUP_REQUIRED_NO_CLIENT_EMAIL: &str =
    "Connector unauthenticated: Client Email is not present.";
pub const SETUP_REQUIRED_NO_PRIVATE_KEY: &str =
    "Connector unauthenticated: Private Key is not present.";
pub const SETUP_REQUIRED_NO_PRIVATE_KEY_ID: &str =
    "Connector unauthenticated: Private Key ID is not present.";
pub const SETUP_REQUIRED_NO_SPREADSHEET_ID: &str =
    "Connector not fully setup: Spreadsheet ID is not configured.";

pub fn warning_no_attribute(kind: ObjectKind) -> String {
    format!(
        "Misconfiguration for {kind}: You have specified segments but no attribute. \
         Go to settings and specify the attribute or remove the segments."
    )
}

pub fn warning_no_range(kind: ObjectKind) -> String {
    format!(
        "Misconfiguration for {kind}: You have specified segments but no range. \
         Go to settings and specify the range in A1 notation or remove the segments."
    )
}

pub fn warning_invalid_range(kind: ObjectKind, reason: &str) -> String {
    format!("Misconfiguration for {kind}: The configured range is not usable ({reason}).")
}
