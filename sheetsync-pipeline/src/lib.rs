//! sheetsync pipeline: turns CRM update notifications into spreadsheet rows.
//!
//! - [`channel`]: notification channels and raw payload decoding
//! - [`mapping`]: envelope and service-object mapping
//! - [`filter`]: segment, mandatory-data and dedup filters
//! - [`range`]: insert range arithmetic
//! - [`agent`]: [`SyncAgent`], one channel invocation end to end
//! - [`status`]: connector health from settings
//! - [`client`]: the [`SheetsClient`] seam
//! - [`workbook`]: [`LocalWorkbook`], a JSON-file-backed client

pub mod agent;
pub mod channel;
pub mod client;
pub mod error;
pub mod filter;
pub mod mapping;
pub mod notes;
pub mod range;
pub mod status;
pub mod workbook;

pub use agent::{ChannelReport, RecordOutcome, SyncAgent, SyncOptions, SyncOutcome, SyncReport};
pub use channel::{map_channel_messages, Channel, ChannelEnvelopes};
pub use client::{SheetProperties, SheetsClient, SpreadsheetInfo, ValueRange, WriteSummary};
pub use error::{PipelineError, ServiceError};
pub use filter::KnownValues;
pub use range::{insert_range, map_current_range_to_insert_range, InsertRange};
pub use status::{determine_status, ConnectorHealth, ConnectorStatus};
pub use workbook::{LocalSheet, LocalWorkbook, Workbook};
