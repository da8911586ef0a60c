//! sheetsync core library: domain types, envelopes, settings, coordinates.
//!
//! - [`types`]: messages, segments and the enums describing sync state
//! - [`envelope`]: [`Envelope`], the per-record unit of work
//! - [`settings`]: [`AppSettings`] and YAML load / save
//! - [`range`]: [`SheetRange`] coordinate parsing
//! - [`error`]: [`SettingsError`], [`RangeError`]

pub mod envelope;
pub mod error;
pub mod range;
pub mod settings;
pub mod types;

pub use envelope::Envelope;
pub use error::{RangeError, SettingsError};
pub use range::SheetRange;
pub use settings::{AppSettings, ObjectSettings};
pub use types::{
    AccountUpdateMessage, ObjectKind, ObjectRecord, OperationResult, Segment, SegmentId,
    ServiceOperation, SourceMessage, UserUpdateMessage,
};
