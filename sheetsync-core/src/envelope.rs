//! The per-record unit of work flowing through the sync pipeline.
//!
//! Every transition consumes the envelope and returns the next one. Results
//! only move away from `Pending`; notes only grow.

use serde::Serialize;
use serde_json::Value;

use crate::types::{ObjectKind, OperationResult, ServiceOperation};

/// A single inbound message plus its synchronization state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<M, S = Value> {
    message: M,
    kind: ObjectKind,
    result: OperationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_object: Option<S>,
    service_operation: ServiceOperation,
    notes: Vec<String>,
}

impl<M, S> Envelope<M, S> {
    /// A fresh `Pending` envelope.
    pub fn new(message: M, kind: ObjectKind) -> Self {
        Self {
            message,
            kind,
            result: OperationResult::Pending,
            service_object: None,
            service_operation: ServiceOperation::Unspecified,
            notes: Vec::new(),
        }
    }

    pub fn message(&self) -> &M {
        &self.message
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn result(&self) -> OperationResult {
        self.result
    }

    pub fn service_object(&self) -> Option<&S> {
        self.service_object.as_ref()
    }

    pub fn service_operation(&self) -> ServiceOperation {
        self.service_operation
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn is_skipped(&self) -> bool {
        self.result == OperationResult::Skip
    }

    /// Mark the envelope as skipped and record why.
    ///
    /// An envelope that already reached a terminal result keeps it; the note
    /// is appended either way.
    pub fn skip(mut self, note: impl Into<String>) -> Self {
        if !self.result.is_terminal() {
            self.result = OperationResult::Skip;
        }
        self.notes.push(note.into());
        self
    }

    /// Append a note without touching the result.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Attach the value to be written. Implies [`ServiceOperation::Write`].
    pub fn with_service_object(mut self, service_object: S) -> Self {
        self.service_object = Some(service_object);
        self.service_operation = ServiceOperation::Write;
        self
    }

    /// Record the outcome of the external write.
    ///
    /// Only a `Pending` envelope changes; skipped envelopes never reach the
    /// write stage and stay skipped.
    pub fn resolve(mut self, succeeded: bool) -> Self {
        if !self.result.is_terminal() {
            self.result = if succeeded {
                OperationResult::Success
            } else {
                OperationResult::Error
            };
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending() -> Envelope<&'static str> {
        Envelope::new("msg", ObjectKind::User)
    }

    #[test]
    fn new_envelope_is_pending_and_unspecified() {
        let env = pending();
        assert_eq!(env.result(), OperationResult::Pending);
        assert_eq!(env.service_operation(), ServiceOperation::Unspecified);
        assert!(env.notes().is_empty());
        assert!(env.service_object().is_none());
    }

    #[test]
    fn skip_accumulates_notes() {
        let env = pending().skip("first").skip("second");
        assert!(env.is_skipped());
        assert_eq!(env.notes(), ["first", "second"]);
    }

    #[test]
    fn skipped_envelope_cannot_be_resolved() {
        let env = pending().skip("filtered").resolve(true);
        assert_eq!(env.result(), OperationResult::Skip);
    }

    #[test]
    fn service_object_implies_write() {
        let env = pending().with_service_object(json!("acme.io"));
        assert_eq!(env.service_operation(), ServiceOperation::Write);
        assert_eq!(env.service_object(), Some(&json!("acme.io")));
        assert_eq!(env.result(), OperationResult::Pending);
    }

    #[test]
    fn resolve_is_terminal() {
        let env = pending().resolve(false).resolve(true);
        assert_eq!(env.result(), OperationResult::Error);
        let env = env.skip("late note");
        assert_eq!(env.result(), OperationResult::Error);
        assert_eq!(env.notes(), ["late note"]);
    }
}
