//! Sync orchestration for one channel invocation.
//!
//! ## `SyncAgent::run`: step order
//!
//! 1. Bail out when credentials or the spreadsheet id are missing.
//! 2. Segment filter, then mandatory-data filter (local, no I/O).
//! 3. Read the configured range of the object kind.
//! 4. Dedup against the first column of that read.
//! 5. Map service objects and compute the insert range.
//! 6. Grow the sheet if the insert range runs past its grid.
//! 7. Write one row per envelope and record the outcome.
//!
//! Steps 3–7 only happen while something is still eligible. A failed read,
//! metadata fetch or resize aborts the run; a failed write is reported per
//! record instead.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use sheetsync_core::{
    AccountUpdateMessage, AppSettings, Envelope, ObjectKind, OperationResult, SourceMessage,
    UserUpdateMessage,
};

use crate::channel::{map_channel_messages, Channel, ChannelEnvelopes};
use crate::client::SheetsClient;
use crate::error::{service_err, PipelineError};
use crate::filter::{filter_already_in_sheet, filter_mandatory_data, filter_segments, KnownValues};
use crate::mapping::{
    map_envelopes_to_service_objects, map_messages_to_envelopes, map_value_range_to_column,
};
use crate::notes;
use crate::range::map_current_range_to_insert_range;

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Per-invocation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Batch imports bypass segment gating.
    pub is_batch: bool,
    /// Compute everything, mutate nothing.
    pub dry_run: bool,
}

/// How a channel invocation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Credentials or spreadsheet id missing; nothing was processed.
    SetupIncomplete,
    /// Every envelope was skipped.
    NoOp,
    /// Rows were written.
    Written { range: String, rows: usize },
    /// `dry_run`: the rows *would* have been written here.
    WouldWrite { range: String, rows: usize },
    /// The final write failed; affected envelopes are marked `error`.
    WriteFailed { range: String, error: String },
}

/// Outcome of one channel invocation, envelopes in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport<M> {
    pub channel: Channel,
    pub started_at: DateTime<Utc>,
    pub outcome: SyncOutcome,
    pub envelopes: Vec<Envelope<M>>,
}

/// Flattened per-record view of an envelope, for printing and JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutcome {
    pub kind: ObjectKind,
    pub object_id: String,
    pub message_id: String,
    pub result: OperationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub notes: Vec<String>,
}

impl<M: SourceMessage> SyncReport<M> {
    pub fn count(&self, result: OperationResult) -> usize {
        self.envelopes.iter().filter(|e| e.result() == result).count()
    }

    pub fn records(&self) -> Vec<RecordOutcome> {
        self.envelopes
            .iter()
            .map(|envelope| RecordOutcome {
                kind: envelope.kind(),
                object_id: envelope.message().record().id.clone(),
                message_id: envelope.message().message_id().to_string(),
                result: envelope.result(),
                value: envelope.service_object().cloned(),
                notes: envelope.notes().to_vec(),
            })
            .collect()
    }
}

/// [`SyncReport`] for whichever channel a string-dispatched run resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelReport {
    User(SyncReport<UserUpdateMessage>),
    Account(SyncReport<AccountUpdateMessage>),
}

impl ChannelReport {
    pub fn channel(&self) -> Channel {
        match self {
            ChannelReport::User(r) => r.channel,
            ChannelReport::Account(r) => r.channel,
        }
    }

    pub fn outcome(&self) -> &SyncOutcome {
        match self {
            ChannelReport::User(r) => &r.outcome,
            ChannelReport::Account(r) => &r.outcome,
        }
    }

    pub fn count(&self, result: OperationResult) -> usize {
        match self {
            ChannelReport::User(r) => r.count(result),
            ChannelReport::Account(r) => r.count(result),
        }
    }

    pub fn records(&self) -> Vec<RecordOutcome> {
        match self {
            ChannelReport::User(r) => r.records(),
            ChannelReport::Account(r) => r.records(),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncAgent
// ---------------------------------------------------------------------------

/// Runs the envelope pipeline against a spreadsheet client.
pub struct SyncAgent<C> {
    settings: AppSettings,
    client: C,
}

impl<C: SheetsClient> SyncAgent<C> {
    pub fn new(settings: AppSettings, client: C) -> Self {
        Self { settings, client }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Process notifications from the `user:update` channel.
    pub async fn send_user_messages(
        &self,
        messages: Vec<UserUpdateMessage>,
        options: SyncOptions,
    ) -> Result<SyncReport<UserUpdateMessage>, PipelineError> {
        self.run(Channel::UserUpdate, map_messages_to_envelopes(messages), options)
            .await
    }

    /// Process notifications from the `account:update` channel.
    pub async fn send_account_messages(
        &self,
        messages: Vec<AccountUpdateMessage>,
        options: SyncOptions,
    ) -> Result<SyncReport<AccountUpdateMessage>, PipelineError> {
        self.run(Channel::AccountUpdate, map_messages_to_envelopes(messages), options)
            .await
    }

    /// Process raw notifications for a channel given by name.
    pub async fn send_messages(
        &self,
        channel: &str,
        raw: Vec<Value>,
        options: SyncOptions,
    ) -> Result<ChannelReport, PipelineError> {
        match map_channel_messages(channel, raw)? {
            ChannelEnvelopes::User(envelopes) => Ok(ChannelReport::User(
                self.run(Channel::UserUpdate, envelopes, options).await?,
            )),
            ChannelEnvelopes::Account(envelopes) => Ok(ChannelReport::Account(
                self.run(Channel::AccountUpdate, envelopes, options).await?,
            )),
        }
    }

    #[instrument(skip_all, fields(channel = %channel, batch = options.is_batch))]
    async fn run<M>(
        &self,
        channel: Channel,
        envelopes: Vec<Envelope<M>>,
        options: SyncOptions,
    ) -> Result<SyncReport<M>, PipelineError>
    where
        M: SourceMessage + Send + Sync,
    {
        let started_at = Utc::now();
        let kind = channel.kind();
        let report = |outcome: SyncOutcome, envelopes: Vec<Envelope<M>>| SyncReport {
            channel,
            started_at,
            outcome,
            envelopes,
        };

        debug!(dry_run = options.dry_run, "sync start");
        info!(count = envelopes.len(), "messages received");

        // Step 1: nothing can be processed without credentials.
        let spreadsheet_id = match self.settings.spreadsheet_id.as_deref() {
            Some(id) if self.settings.is_setup_complete() => id,
            _ => {
                debug!("setup incomplete, skipping run");
                return Ok(report(SyncOutcome::SetupIncomplete, envelopes));
            }
        };

        // Step 2: local filters.
        let envelopes = filter_segments(envelopes, &self.settings, options.is_batch);
        let envelopes = filter_mandatory_data(envelopes, &self.settings);
        log_skipped(&envelopes, &[]);
        if !any_eligible(&envelopes) {
            debug!("all envelopes skipped, nothing to do");
            return Ok(report(SyncOutcome::NoOp, envelopes));
        }

        let Some(range) = self.settings.for_kind(kind).range else {
            let before = skipped_flags(&envelopes);
            let envelopes: Vec<_> = envelopes
                .into_iter()
                .map(|e| {
                    if e.is_skipped() {
                        e
                    } else {
                        e.skip(notes::no_range_configured(kind))
                    }
                })
                .collect();
            log_skipped(&envelopes, &before);
            return Ok(report(SyncOutcome::NoOp, envelopes));
        };

        // Step 3: read what the sheet already holds.
        info!(operation = "read_range", range, "service api call");
        let current = self
            .client
            .read_range(spreadsheet_id, range)
            .await
            .map_err(|e| {
                error!(range, error = %e, details = ?e.details, "reading range failed");
                service_err("read range", e)
            })?;

        // Step 4: dedup against the first column.
        let known: KnownValues = map_value_range_to_column(&current).into_iter().collect();
        let before = skipped_flags(&envelopes);
        let envelopes = filter_already_in_sheet(envelopes, &self.settings, &known);
        log_skipped(&envelopes, &before);
        if !any_eligible(&envelopes) {
            debug!("all envelopes already in sheet, nothing to do");
            return Ok(report(SyncOutcome::NoOp, envelopes));
        }

        // Step 5: service objects and destination.
        let envelopes = map_envelopes_to_service_objects(envelopes, &self.settings);
        let values: Vec<Vec<Value>> = envelopes
            .iter()
            .filter(|e| !e.is_skipped())
            .map(|e| vec![e.service_object().cloned().unwrap_or(Value::Null)])
            .collect();
        let insert = map_current_range_to_insert_range(&current, values.len())?;
        let rows = values.len();

        if options.dry_run {
            info!(range = %insert.range, rows, "[dry-run] would write");
            return Ok(report(
                SyncOutcome::WouldWrite {
                    range: insert.range,
                    rows,
                },
                envelopes,
            ));
        }

        // Step 6: make room.
        info!(operation = "get_spreadsheet", "service api call");
        let spreadsheet = self
            .client
            .get_spreadsheet(spreadsheet_id)
            .await
            .map_err(|e| {
                error!(error = %e, details = ?e.details, "fetching spreadsheet failed");
                service_err("get spreadsheet", e)
            })?;
        let sheet = spreadsheet
            .sheet(&insert.sheet_title)
            .ok_or_else(|| PipelineError::SheetNotFound {
                title: insert.sheet_title.clone(),
            })?;
        if sheet.row_count < insert.max_row {
            let missing = insert.max_row - sheet.row_count;
            debug!(
                sheet = %sheet.title,
                row_count = sheet.row_count,
                max_row = insert.max_row,
                "insufficient space, appending {missing} rows"
            );
            info!(operation = "append_rows", "service api call");
            self.client
                .append_rows(spreadsheet_id, sheet.sheet_id, missing)
                .await
                .map_err(|e| {
                    error!(error = %e, details = ?e.details, "resizing sheet failed");
                    service_err("resize sheet", e)
                })?;
        }

        // Step 7: write and record the outcome per envelope.
        info!(operation = "write_range", range = %insert.range, rows, "service api call");
        let (outcome, failure) = match self
            .client
            .write_range(spreadsheet_id, &insert.range, values)
            .await
        {
            Ok(summary) => (
                SyncOutcome::Written {
                    range: summary.updated_range,
                    rows,
                },
                None,
            ),
            Err(e) => {
                error!(range = %insert.range, error = %e, details = ?e.details, "writing range failed");
                (
                    SyncOutcome::WriteFailed {
                        range: insert.range.clone(),
                        error: e.to_string(),
                    },
                    Some(e.messages),
                )
            }
        };

        let envelopes: Vec<_> = envelopes
            .into_iter()
            .map(|envelope| {
                if envelope.is_skipped() {
                    return envelope;
                }
                let envelope = match &failure {
                    Some(messages) => messages
                        .iter()
                        .fold(envelope, |env, m| env.with_note(m.clone())),
                    None => envelope,
                };
                let envelope = envelope.resolve(failure.is_none());
                log_outcome(&envelope);
                envelope
            })
            .collect();

        Ok(report(outcome, envelopes))
    }
}

fn any_eligible<M>(envelopes: &[Envelope<M>]) -> bool {
    envelopes.iter().any(|e| !e.is_skipped())
}

fn skipped_flags<M>(envelopes: &[Envelope<M>]) -> Vec<bool> {
    envelopes.iter().map(Envelope::is_skipped).collect()
}

/// Log envelopes that became skipped since `before` was taken.
fn log_skipped<M: SourceMessage>(envelopes: &[Envelope<M>], before: &[bool]) {
    for (i, envelope) in envelopes.iter().enumerate() {
        let was_skipped = before.get(i).copied().unwrap_or(false);
        if envelope.is_skipped() && !was_skipped {
            log_outcome(envelope);
        }
    }
}

fn log_outcome<M: SourceMessage>(envelope: &Envelope<M>) {
    let message = envelope.message();
    let id = &message.record().id;
    let message_id = message.message_id();
    let notes = envelope.notes();
    match envelope.result() {
        OperationResult::Error => error!(
            target: "outgoing",
            id = %id,
            message_id,
            ?notes,
            "outgoing.{}.{}",
            envelope.kind(),
            envelope.result()
        ),
        _ => info!(
            target: "outgoing",
            id = %id,
            message_id,
            ?notes,
            "outgoing.{}.{}",
            envelope.kind(),
            envelope.result()
        ),
    }
}
