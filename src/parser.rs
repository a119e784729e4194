//! Share-link batch parsing.
//!
//! A batch is a pile of text lines, one share-link each, possibly wrapped as
//! a single Base64 blob by the subscription feed. [`LinkParser`] normalizes
//! the batch, dispatches every line to the decoder owning its scheme, and
//! collects the successes and the per-line failures side by side. A bad line
//! never aborts the batch; an empty result is the caller's problem to
//! escalate.

pub mod base64;
pub mod protocols;

pub use protocols::{ProtocolParser, ProtocolRegistry};

use tracing::{debug, warn};

use crate::config::proxy::Proxy;
use crate::error::LineFailure;
use crate::parser::base64::decode_base64_text;
use crate::parser::protocols::extract_scheme;

/// Outcome of parsing one batch: decoded entries in source order, plus a
/// record for every line that was skipped.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub proxies: Vec<Proxy>,
    pub failures: Vec<LineFailure>,
}

/// Batch parser dispatching lines to per-protocol decoders
pub struct LinkParser {
    registry: ProtocolRegistry,
}

impl Default for LinkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkParser {
    /// Parser with all built-in decoders
    pub fn new() -> Self {
        Self {
            registry: ProtocolRegistry::with_builtin_parsers(),
        }
    }

    /// Parser with a caller-supplied registry
    pub fn with_registry(registry: ProtocolRegistry) -> Self {
        Self { registry }
    }

    /// Parse a whole batch of content.
    ///
    /// Successful entries keep the order of their source lines; skipped
    /// lines leave no placeholder behind.
    pub fn parse_batch(&self, content: &str) -> ParsedBatch {
        let content = normalize_batch(content);
        let mut batch = ParsedBatch::default();

        let lines = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));

        for line in lines {
            match self.parse_line(line) {
                Ok(proxy) => batch.proxies.push(proxy),
                Err(reason) => {
                    warn!("Skipping line: {}", reason);
                    batch.failures.push(LineFailure::new(line, reason));
                }
            }
        }

        debug!(
            "Batch parsed: {} ok, {} skipped",
            batch.proxies.len(),
            batch.failures.len()
        );
        batch
    }

    fn parse_line(&self, line: &str) -> Result<Proxy, String> {
        let Some(scheme) = extract_scheme(line) else {
            return Err("unrecognized scheme: not a share link".to_string());
        };

        let Some(parser) = self.registry.get(scheme) else {
            return Err(format!("unrecognized scheme: {scheme}://"));
        };

        parser.parse(line).map_err(|e| format!("failed: {e}"))
    }
}

/// Undo whole-batch Base64 wrapping when present.
///
/// Content whose lines already carry a known scheme passes through
/// untouched. Anything else gets one Base64 decode attempt; the decoded
/// text is used only when it looks like a link batch itself.
fn normalize_batch(content: &str) -> String {
    if first_line_has_scheme(content) {
        return content.to_string();
    }

    if let Ok(decoded) = decode_base64_text(content)
        && first_line_has_scheme(&decoded)
    {
        debug!("Batch was Base64-wrapped, decoded {} bytes", decoded.len());
        return decoded;
    }

    content.to_string()
}

fn first_line_has_scheme(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .and_then(extract_scheme)
        .is_some()
}
