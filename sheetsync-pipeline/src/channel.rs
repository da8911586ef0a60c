//! Registered notification channels.
//!
//! Dispatch is a closed enum: adding a channel means adding a variant, and
//! every `match` over [`Channel`] has to handle it.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

use sheetsync_core::{AccountUpdateMessage, Envelope, ObjectKind, UserUpdateMessage};

use crate::error::PipelineError;
use crate::mapping::map_messages_to_envelopes;

/// A notification channel the connector accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    UserUpdate,
    AccountUpdate,
}

impl Channel {
    /// Every channel, in registration order.
    pub const ALL: [Channel; 2] = [Channel::UserUpdate, Channel::AccountUpdate];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::UserUpdate => "user:update",
            Channel::AccountUpdate => "account:update",
        }
    }

    /// Object kind every envelope created from this channel carries.
    pub fn kind(self) -> ObjectKind {
        match self {
            Channel::UserUpdate => ObjectKind::User,
            Channel::AccountUpdate => ObjectKind::Account,
        }
    }

    /// `user:update, account:update`
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| PipelineError::UnknownChannel {
                channel: s.to_string(),
                allowed: Self::allowed_names(),
            })
    }
}

/// Envelopes produced for one channel invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEnvelopes {
    User(Vec<Envelope<UserUpdateMessage>>),
    Account(Vec<Envelope<AccountUpdateMessage>>),
}

impl ChannelEnvelopes {
    pub fn channel(&self) -> Channel {
        match self {
            ChannelEnvelopes::User(_) => Channel::UserUpdate,
            ChannelEnvelopes::Account(_) => Channel::AccountUpdate,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChannelEnvelopes::User(envelopes) => envelopes.len(),
            ChannelEnvelopes::Account(envelopes) => envelopes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve `channel`, decode each raw message into the channel's message type
/// and wrap them into `Pending` envelopes, preserving input order.
pub fn map_channel_messages(
    channel: &str,
    raw: Vec<Value>,
) -> Result<ChannelEnvelopes, PipelineError> {
    match channel.parse::<Channel>()? {
        Channel::UserUpdate => Ok(ChannelEnvelopes::User(map_messages_to_envelopes(
            decode_messages(raw)?,
        ))),
        Channel::AccountUpdate => Ok(ChannelEnvelopes::Account(map_messages_to_envelopes(
            decode_messages(raw)?,
        ))),
    }
}

pub(crate) fn decode_messages<M: DeserializeOwned>(
    raw: Vec<Value>,
) -> Result<Vec<M>, PipelineError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value)
                .map_err(|source| PipelineError::InvalidMessage { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheetsync_core::OperationResult;

    #[test]
    fn unknown_channel_lists_allowed_channels_in_order() {
        let err = "foo".parse::<Channel>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Channel 'foo' is not registered. Allowed channels are user:update, account:update."
        );
        match err {
            PipelineError::UnknownChannel { allowed, .. } => {
                assert_eq!(allowed, "user:update, account:update")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn channel_names_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
        assert_eq!(Channel::AccountUpdate.kind(), ObjectKind::Account);
    }

    #[test]
    fn maps_account_channel_into_account_envelopes() {
        let raw = vec![
            json!({ "account": { "id": "a1", "domain": "acme.io" }, "account_segments": [] }),
            json!({ "account": { "id": "a2" }, "message_id": "m2" }),
        ];
        let mapped = map_channel_messages("account:update", raw).unwrap();
        assert_eq!(mapped.channel(), Channel::AccountUpdate);
        let ChannelEnvelopes::Account(envelopes) = mapped else {
            panic!("expected account envelopes");
        };
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].message().account.id, "a1");
        assert_eq!(envelopes[1].message().account.id, "a2");
        assert!(envelopes
            .iter()
            .all(|e| e.kind() == ObjectKind::Account && e.result() == OperationResult::Pending));
    }

    #[test]
    fn invalid_message_reports_its_position() {
        let raw = vec![json!({ "user": { "id": "u1" } }), json!({ "nope": true })];
        let err = map_channel_messages("user:update", raw).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidMessage { index: 1, .. }), "got: {err}");
    }

    #[test]
    fn unknown_channel_fails_before_decoding() {
        let err = map_channel_messages("event:track", vec![json!(42)]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownChannel { .. }));
    }
}
