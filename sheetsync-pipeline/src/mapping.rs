//! Message → envelope → service object mapping.

use serde_json::Value;

use sheetsync_core::{AppSettings, Envelope, ObjectKind, SourceMessage};

use crate::client::ValueRange;
use crate::notes;

/// Wrap every message into a `Pending` envelope of the message's kind.
pub fn map_messages_to_envelopes<M: SourceMessage>(messages: Vec<M>) -> Vec<Envelope<M>> {
    messages
        .into_iter()
        .map(|message| Envelope::new(message, M::KIND))
        .collect()
}

/// First cell of every row of a one-column read. A row without cells maps to
/// `null` so positions keep lining up with sheet rows.
pub fn map_value_range_to_column(range: &ValueRange) -> Vec<Value> {
    range
        .values
        .iter()
        .map(|row| row.first().cloned().unwrap_or(Value::Null))
        .collect()
}

/// Attach the configured attribute's value to every envelope that is still
/// eligible. Skipped envelopes pass through untouched.
///
/// The value is written verbatim, whatever its JSON type.
pub fn map_envelopes_to_service_objects<M: SourceMessage>(
    envelopes: Vec<Envelope<M>>,
    settings: &AppSettings,
) -> Vec<Envelope<M>> {
    envelopes
        .into_iter()
        .map(|envelope| {
            if envelope.is_skipped() {
                return envelope;
            }
            match lookup_attribute(envelope.message(), envelope.kind(), settings) {
                AttributeLookup::Found(value) => envelope.with_service_object(value),
                lookup => {
                    let note = lookup.skip_note(envelope.kind());
                    envelope.skip(note)
                }
            }
        })
        .collect()
}

/// Outcome of resolving the configured attribute on a message.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttributeLookup<'a> {
    NotConfigured,
    Missing(&'a str),
    Found(Value),
}

impl AttributeLookup<'_> {
    pub(crate) fn skip_note(&self, kind: ObjectKind) -> String {
        match self {
            AttributeLookup::NotConfigured => notes::no_attribute_configured(kind),
            AttributeLookup::Missing(attribute) => notes::no_value_for_attribute(kind, attribute),
            AttributeLookup::Found(_) => String::new(),
        }
    }
}

pub(crate) fn lookup_attribute<'a, M: SourceMessage>(
    message: &M,
    kind: ObjectKind,
    settings: &'a AppSettings,
) -> AttributeLookup<'a> {
    let Some(attribute) = settings.for_kind(kind).attribute else {
        return AttributeLookup::NotConfigured;
    };
    match message.attribute(attribute) {
        Some(value) => AttributeLookup::Found(value),
        None => AttributeLookup::Missing(attribute),
    }
}
