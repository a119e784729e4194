//! Pipeline orchestration.
//!
//! [`Converter`] wires the batch parser, the document builder and the
//! external validator together: raw content in, validated document text out.
//! All three collaborators are plain values injected at construction; there
//! is no process-wide state.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::builder::ConfigBuilder;
use crate::error::LineFailure;
use crate::parser::LinkParser;
use crate::render;
use crate::settings::Settings;
use crate::validate::Validator;

/// Outcome of one conversion
#[derive(Debug)]
pub struct Conversion {
    /// Rendered (and, unless skipped, validated) document text
    pub document: String,
    /// Number of proxy entries in the document
    pub proxy_count: usize,
    /// Lines that were skipped during decoding
    pub failures: Vec<LineFailure>,
}

/// The decode → build → render → validate pipeline
pub struct Converter {
    parser: LinkParser,
    builder: ConfigBuilder,
    validator: Validator,
}

impl Converter {
    pub fn new(parser: LinkParser, builder: ConfigBuilder, validator: Validator) -> Self {
        Self {
            parser,
            builder,
            validator,
        }
    }

    /// Converter configured from runtime settings
    pub fn with_settings(settings: &Settings) -> Self {
        Self::new(
            LinkParser::new(),
            ConfigBuilder::new(),
            Validator::new(
                &settings.validator_bin,
                Duration::from_secs(settings.validate_timeout),
            ),
        )
    }

    /// Run the full pipeline over one batch of raw content.
    ///
    /// Per-line decode failures are collected into the outcome; an empty
    /// decode result, a rejected document, or an unusable validator binary
    /// abort with the matching [`crate::error::ConvertError`] variant.
    pub async fn convert(&self, content: &str, validate: bool) -> Result<Conversion> {
        let batch = self.parser.parse_batch(content);
        info!(
            "Decoded {} prox(ies), {} line(s) skipped",
            batch.proxies.len(),
            batch.failures.len()
        );

        let failures = batch.failures;
        let config = self.builder.build(batch.proxies, &failures)?;
        let proxy_count = config.proxies.len();

        let document = render::render_now(&config)?;

        if validate {
            self.validator.validate(&document).await?;
            info!("Document passed strict validation");
        }

        Ok(Conversion {
            document,
            proxy_count,
            failures,
        })
    }
}
