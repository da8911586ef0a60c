//! Domain types for CRM update messages and their synchronization state.
//!
//! Messages deserialize from the CRM's JSON notification shape. Arbitrary
//! record attributes are kept as `serde_json::Value` and reached through
//! [`ObjectRecord::attribute`] rather than by deep-getting untyped JSON.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a CRM segment. Filtering compares these and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub String);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SegmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SegmentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The CRM object an envelope was created for. Fixed at envelope creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    User,
    Account,
    Event,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::User => write!(f, "user"),
            ObjectKind::Account => write!(f, "account"),
            ObjectKind::Event => write!(f, "event"),
        }
    }
}

/// Synchronization outcome of a single envelope.
///
/// Starts `Pending`; `Skip`, `Success` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OperationResult {
    #[default]
    Pending,
    Skip,
    Success,
    Error,
}

impl OperationResult {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OperationResult::Pending)
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationResult::Pending => write!(f, "pending"),
            OperationResult::Skip => write!(f, "skip"),
            OperationResult::Success => write!(f, "success"),
            OperationResult::Error => write!(f, "error"),
        }
    }
}

/// What the service side will do with an envelope's service object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceOperation {
    #[default]
    Unspecified,
    Write,
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A named cohort a user or account currently belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub segment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The user or account object nested in an update message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Every other field of the record (`email`, `domain`, traits, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ObjectRecord {
    /// Look up an attribute by name.
    ///
    /// Dotted names descend into nested objects (`address.city`). A JSON
    /// `null` is reported as absent.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => return Some(Value::String(self.id.clone())),
            "external_id" => return self.external_id.clone().map(Value::String),
            _ => {}
        }

        // A flat key wins over a dotted path with the same spelling.
        if let Some(value) = self.attributes.get(name) {
            return non_null(value);
        }

        let mut parts = name.split('.');
        let first = parts.next()?;
        let mut current = self.attributes.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        non_null(current)
    }
}

fn non_null(value: &Value) -> Option<Value> {
    if value.is_null() {
        None
    } else {
        Some(value.clone())
    }
}

/// Inbound notification for the `user:update` channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdateMessage {
    pub user: ObjectRecord,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub message_id: String,
}

/// Inbound notification for the `account:update` channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdateMessage {
    pub account: ObjectRecord,
    #[serde(default)]
    pub account_segments: Vec<Segment>,
    #[serde(default)]
    pub message_id: String,
}

/// Accessor capability shared by every inbound message type.
pub trait SourceMessage {
    /// Kind of object this message carries.
    const KIND: ObjectKind;

    fn record(&self) -> &ObjectRecord;

    /// Segments relevant for this kind: `segments` for users,
    /// `account_segments` for accounts.
    fn segments(&self) -> &[Segment];

    fn message_id(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<Value> {
        self.record().attribute(name)
    }
}

impl SourceMessage for UserUpdateMessage {
    const KIND: ObjectKind = ObjectKind::User;

    fn record(&self) -> &ObjectRecord {
        &self.user
    }

    fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn message_id(&self) -> &str {
        &self.message_id
    }
}

impl SourceMessage for AccountUpdateMessage {
    const KIND: ObjectKind = ObjectKind::Account;

    fn record(&self) -> &ObjectRecord {
        &self.account
    }

    fn segments(&self) -> &[Segment] {
        &self.account_segments
    }

    fn message_id(&self) -> &str {
        &self.message_id
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ObjectRecord {
        serde_json::from_value(value).expect("record")
    }

    #[test]
    fn attribute_reads_flat_and_builtin_fields() {
        let r = record(json!({
            "id": "u-1",
            "external_id": "ext-1",
            "email": "jane@example.com",
        }));
        assert_eq!(r.attribute("id"), Some(json!("u-1")));
        assert_eq!(r.attribute("external_id"), Some(json!("ext-1")));
        assert_eq!(r.attribute("email"), Some(json!("jane@example.com")));
        assert_eq!(r.attribute("domain"), None);
    }

    #[test]
    fn attribute_treats_null_as_absent() {
        let r = record(json!({ "id": "u-1", "email": null }));
        assert_eq!(r.attribute("email"), None);
        assert_eq!(r.attribute("external_id"), None);
    }

    #[test]
    fn attribute_descends_dotted_paths() {
        let r = record(json!({
            "id": "a-1",
            "address": { "city": "Berlin", "zip": null },
            "traits/score": 7,
        }));
        assert_eq!(r.attribute("address.city"), Some(json!("Berlin")));
        assert_eq!(r.attribute("address.zip"), None);
        assert_eq!(r.attribute("address.city.name"), None);
        assert_eq!(r.attribute("traits/score"), Some(json!(7)));
    }

    #[test]
    fn account_message_exposes_account_segments() {
        let msg: AccountUpdateMessage = serde_json::from_value(json!({
            "account": { "id": "a-1", "domain": "example.com" },
            "account_segments": [{ "id": "s1", "name": "Leads", "type": "accounts_segment" }],
            "segments": [{ "id": "ignored" }],
            "message_id": "m-1",
        }))
        .expect("message");
        assert_eq!(AccountUpdateMessage::KIND, ObjectKind::Account);
        assert_eq!(msg.segments().len(), 1);
        assert_eq!(msg.segments()[0].id, SegmentId::from("s1"));
        assert_eq!(msg.message_id(), "m-1");
    }

    #[test]
    fn display_impls() {
        assert_eq!(ObjectKind::Account.to_string(), "account");
        assert_eq!(OperationResult::Skip.to_string(), "skip");
        assert!(OperationResult::Error.is_terminal());
        assert!(!OperationResult::Pending.is_terminal());
    }
}
