//! The three eligibility filters.
//!
//! Each filter maps a sequence of envelopes to a sequence of the same length
//! and order. Envelopes are never dropped, only marked `skip` with a note.
//! Order matters: segments and mandatory data are purely local checks, the
//! sheet dedup needs a range read and runs last.

use std::collections::HashSet;

use serde_json::Value;

use sheetsync_core::{AppSettings, Envelope, SegmentId, SourceMessage};

use crate::mapping::{lookup_attribute, AttributeLookup};
use crate::notes;

/// Skip envelopes whose record is in none of the synchronized segments of its
/// kind. Batch imports bypass segment gating entirely.
pub fn filter_segments<M: SourceMessage>(
    envelopes: Vec<Envelope<M>>,
    settings: &AppSettings,
    is_batch: bool,
) -> Vec<Envelope<M>> {
    if is_batch {
        return envelopes;
    }

    envelopes
        .into_iter()
        .map(|envelope| {
            let whitelist = settings.for_kind(envelope.kind()).synchronized_segments;
            if is_in_any_segment(envelope.message(), whitelist) {
                envelope
            } else {
                let note = notes::not_in_any_segment(envelope.kind());
                envelope.skip(note)
            }
        })
        .collect()
}

/// Skip envelopes when no attribute is configured for their kind or the
/// record has no value for it.
pub fn filter_mandatory_data<M: SourceMessage>(
    envelopes: Vec<Envelope<M>>,
    settings: &AppSettings,
) -> Vec<Envelope<M>> {
    envelopes
        .into_iter()
        .map(|envelope| match lookup_attribute(envelope.message(), envelope.kind(), settings) {
            AttributeLookup::Found(_) => envelope,
            lookup => {
                let note = lookup.skip_note(envelope.kind());
                envelope.skip(note)
            }
        })
        .collect()
}

/// Skip surviving envelopes whose attribute value is already present in the
/// sheet. Envelopes skipped by an earlier stage pass through untouched.
///
/// Re-checks the attribute configuration so it stays safe to call on its own;
/// a record without a value cannot match anything and passes through.
pub fn filter_already_in_sheet<M: SourceMessage>(
    envelopes: Vec<Envelope<M>>,
    settings: &AppSettings,
    known: &KnownValues,
) -> Vec<Envelope<M>> {
    envelopes
        .into_iter()
        .map(|envelope| {
            if envelope.is_skipped() {
                return envelope;
            }
            match lookup_attribute(envelope.message(), envelope.kind(), settings) {
                AttributeLookup::NotConfigured => {
                    let note = notes::no_attribute_configured(envelope.kind());
                    envelope.skip(note)
                }
                AttributeLookup::Found(value) if known.contains(&value) => {
                    let note = notes::already_in_sheet(envelope.kind());
                    envelope.skip(note)
                }
                _ => envelope,
            }
        })
        .collect()
}

fn is_in_any_segment<M: SourceMessage>(message: &M, whitelist: &[SegmentId]) -> bool {
    message
        .segments()
        .iter()
        .any(|segment| whitelist.contains(&segment.id))
}

/// Scalar values already present in the sheet's data column.
///
/// Numbers compare by numeric value, so a sheet cell read back as `1.0`
/// matches an attribute of `1`. Other values compare by JSON equality.
#[derive(Debug, Clone, Default)]
pub struct KnownValues {
    keys: HashSet<CellKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellKey {
    Null,
    Bool(bool),
    Number(u64),
    Text(String),
    Other(String),
}

impl CellKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => CellKey::Null,
            Value::Bool(b) => CellKey::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                // -0.0 and 0.0 are the same cell value.
                Some(f) if f == 0.0 => CellKey::Number(0f64.to_bits()),
                Some(f) => CellKey::Number(f.to_bits()),
                None => CellKey::Other(n.to_string()),
            },
            Value::String(s) => CellKey::Text(s.clone()),
            other => CellKey::Other(other.to_string()),
        }
    }
}

impl KnownValues {
    pub fn contains(&self, value: &Value) -> bool {
        self.keys.contains(&CellKey::of(value))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<'a> FromIterator<&'a Value> for KnownValues {
    fn from_iter<I: IntoIterator<Item = &'a Value>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(CellKey::of).collect(),
        }
    }
}

impl FromIterator<Value> for KnownValues {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(|v| CellKey::of(&v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheetsync_core::{AccountUpdateMessage, OperationResult, UserUpdateMessage};

    use crate::mapping::map_messages_to_envelopes;

    fn user(id: &str, email: Value, segments: &[&str]) -> UserUpdateMessage {
        let segments: Vec<Value> = segments
            .iter()
            .map(|s| json!({ "id": s, "name": format!("Segment {s}") }))
            .collect();
        serde_json::from_value(json!({
            "user": { "id": id, "email": email },
            "segments": segments,
            "message_id": format!("msg-{id}"),
        }))
        .unwrap()
    }

    fn settings(segments: &[&str], attribute: Option<&str>) -> AppSettings {
        AppSettings {
            user_synchronized_segments: segments.iter().map(|s| SegmentId::from(*s)).collect(),
            user_attribute: attribute.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn segment_filter_skips_records_without_a_matching_segment() {
        let envelopes = map_messages_to_envelopes(vec![
            user("1", json!("a@x.io"), &[]),
            user("2", json!("b@x.io"), &["seg2", "seg1"]),
            user("3", json!("c@x.io"), &["seg9"]),
        ]);
        let out = filter_segments(envelopes, &settings(&["seg1"], Some("email")), false);

        assert_eq!(out.len(), 3);
        assert!(out[0].is_skipped());
        assert!(out[0].notes()[0].contains("not matching any of the synchronized segments"));
        assert_eq!(out[1].result(), OperationResult::Pending);
        assert!(out[1].notes().is_empty());
        assert!(out[2].is_skipped());
    }

    #[test]
    fn segment_filter_ignores_segment_names() {
        let msg: UserUpdateMessage = serde_json::from_value(json!({
            "user": { "id": "1" },
            "segments": [{ "id": "other", "name": "seg1" }],
        }))
        .unwrap();
        let out = filter_segments(map_messages_to_envelopes(vec![msg]), &settings(&["seg1"], None), false);
        assert!(out[0].is_skipped());
    }

    #[test]
    fn segment_filter_is_identity_for_batches() {
        let envelopes = map_messages_to_envelopes(vec![
            user("1", json!("a@x.io"), &[]),
            user("2", json!("b@x.io"), &["nope"]),
        ]);
        let out = filter_segments(envelopes.clone(), &settings(&["seg1"], None), true);
        assert_eq!(out, envelopes);
    }

    #[test]
    fn segment_filter_reads_account_segments_for_accounts() {
        let msg: AccountUpdateMessage = serde_json::from_value(json!({
            "account": { "id": "a1", "domain": "acme.io" },
            "segments": [{ "id": "acc-seg" }],
            "account_segments": [{ "id": "acc-seg" }],
        }))
        .unwrap();
        let settings = AppSettings {
            account_synchronized_segments: vec![SegmentId::from("acc-seg")],
            user_synchronized_segments: vec![],
            ..Default::default()
        };
        let out = filter_segments(map_messages_to_envelopes(vec![msg]), &settings, false);
        assert_eq!(out[0].result(), OperationResult::Pending);
    }

    #[test]
    fn mandatory_filter_skips_everything_without_attribute_config() {
        let envelopes = map_messages_to_envelopes(vec![
            user("1", json!("a@x.io"), &["seg1"]),
            user("2", json!("b@x.io"), &["seg1"]),
        ]);
        let out = filter_mandatory_data(envelopes, &settings(&["seg1"], None));
        assert!(out.iter().all(|e| e.is_skipped()));
        assert!(out[0].notes()[0].contains("no attribute configured"));
    }

    #[test]
    fn mandatory_filter_names_missing_attribute_and_keeps_prior_notes() {
        let envelopes = map_messages_to_envelopes(vec![
            user("1", Value::Null, &[]),
            user("2", json!("b@x.io"), &["seg1"]),
        ]);
        let settings = settings(&["seg1"], Some("email"));
        let out = filter_mandatory_data(filter_segments(envelopes, &settings, false), &settings);

        assert!(out[0].is_skipped());
        assert_eq!(out[0].notes().len(), 2);
        assert!(out[0].notes()[0].contains("segments"));
        assert!(out[0].notes()[1].contains("mandatory attribute 'email'"));
        assert_eq!(out[1].result(), OperationResult::Pending);
    }

    #[test]
    fn dedup_filter_skips_values_already_in_sheet() {
        let envelopes = map_messages_to_envelopes(vec![
            user("1", json!("a@x.io"), &[]),
            user("2", json!("b@x.io"), &[]),
        ]);
        let known: KnownValues = [json!("email"), json!("a@x.io")].into_iter().collect();
        let out = filter_already_in_sheet(envelopes, &settings(&[], Some("email")), &known);

        assert!(out[0].is_skipped());
        assert!(out[0].notes()[0].contains("already present in the spreadsheet"));
        assert_eq!(out[1].result(), OperationResult::Pending);
    }

    #[test]
    fn dedup_filter_leaves_skipped_envelopes_alone() {
        let envelopes = map_messages_to_envelopes(vec![user("1", json!("a@x.io"), &[])]);
        let envelopes = vec![envelopes[0].clone().skip("earlier stage")];
        let known: KnownValues = [json!("a@x.io")].into_iter().collect();
        let out = filter_already_in_sheet(envelopes, &settings(&[], Some("email")), &known);
        assert_eq!(out[0].notes(), ["earlier stage"]);
    }

    #[test]
    fn dedup_filter_rechecks_attribute_configuration() {
        let envelopes = map_messages_to_envelopes(vec![user("1", json!("a@x.io"), &[])]);
        let out = filter_already_in_sheet(envelopes, &settings(&[], None), &KnownValues::default());
        assert!(out[0].is_skipped());
        assert!(out[0].notes()[0].contains("no attribute configured"));
    }

    #[test]
    fn known_values_compare_numbers_numerically() {
        let known: KnownValues = [json!(1.0), json!("2"), json!(true), json!(-0.0)]
            .into_iter()
            .collect();
        assert!(known.contains(&json!(1)));
        assert!(known.contains(&json!("2")));
        assert!(!known.contains(&json!(2)));
        assert!(!known.contains(&json!("1")));
        assert!(known.contains(&json!(true)));
        assert!(known.contains(&json!(0)));
        assert_eq!(known.len(), 4);
    }
}
