//! The `parse` step — metadata-only parsing with pluggable format handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::{DataContext, StepError, StepHandler, StepPayload};

/// Heavier format conversion (file content transformation and the like) is
/// delegated to an implementation of this trait, keyed by the payload's
/// `format` field. Formats with no registered parser are a no-op, not a
/// failure.
#[async_trait]
pub trait FormatParser: Send + Sync {
    async fn parse(
        &self,
        payload: &StepPayload,
        ctx: DataContext,
    ) -> Result<DataContext, StepError>;
}

/// Executes `parse` steps: records when and what kind of parse was declared,
/// then hands off to a format parser if one is registered.
#[derive(Default)]
pub struct ParseHandler {
    formats: HashMap<String, Arc<dyn FormatParser>>,
}

impl ParseHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a format parser under the given `format` tag.
    pub fn with_format(mut self, format: impl Into<String>, parser: Arc<dyn FormatParser>) -> Self {
        self.formats.insert(format.into(), parser);
        self
    }
}

#[async_trait]
impl StepHandler for ParseHandler {
    async fn execute(
        &self,
        payload: &StepPayload,
        mut ctx: DataContext,
    ) -> Result<DataContext, StepError> {
        let parse_type = payload.require_str("parseType")?.to_owned();

        ctx.insert("parsed_at", json!(Utc::now().to_rfc3339()));
        ctx.insert("parse_type", json!(parse_type));

        if let Some(format) = payload.str_field("format") {
            match self.formats.get(format) {
                Some(parser) => {
                    ctx = parser.parse(payload, ctx).await?;
                }
                None => debug!(format, "no parser registered for format, skipping"),
            }
        }

        Ok(ctx)
    }
}
