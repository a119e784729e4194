//! Error types shared across the conversion pipeline.
//!
//! Per-link problems are represented by [`DecodeError`] and recorded as
//! [`LineFailure`]s without aborting the batch. Whole-conversion failures are
//! the variants of [`ConvertError`], kept distinct so a caller can tell
//! "broken input" from "broken environment".

use thiserror::Error;

/// Failure to decode a single share-link.
///
/// Localized to one input line; the batch parser records it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{protocol}: {reason}")]
pub struct DecodeError {
    /// Scheme label of the decoder that rejected the link (e.g. "vmess").
    pub protocol: &'static str,
    pub reason: String,
}

impl DecodeError {
    pub fn new(protocol: &'static str, reason: impl Into<String>) -> Self {
        Self {
            protocol,
            reason: reason.into(),
        }
    }
}

/// One skipped input line together with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub line: String,
    pub reason: String,
}

impl LineFailure {
    pub fn new(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            reason: reason.into(),
        }
    }
}

/// Fatal, whole-conversion failures.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Not a single input line survived decoding. Carries the per-line
    /// failure records so the caller can report why.
    #[error("no usable proxy links in input ({} line(s) rejected)", .failures.len())]
    EmptyBatch { failures: Vec<LineFailure> },

    /// The external validator rejected the rendered document. The raw tool
    /// output is preserved verbatim.
    #[error("config validation failed: {diagnostic}")]
    Validation { diagnostic: String },

    /// A required external binary is missing or cannot be executed.
    #[error("{tool} unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    /// Fetching remote content failed or timed out. Retrying is the
    /// caller's policy.
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    /// The external conversion service answered, but not with a usable
    /// Clash document.
    #[error("conversion service response is not a Clash document: {reason}")]
    RemoteConversion { reason: String },
}
