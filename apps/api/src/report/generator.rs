//! Report Generator — turns a marker selection into a finished report.
//!
//! Flow: sufficiency gate → build prompt → one completion call → extract text →
//! stamp id and timestamp.
//!
//! Without a configured completion service the generator returns a deterministic
//! placeholder report instead of failing, so upload and persistence stay usable.
//! Failures are never retried here.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::catalog::{TierDefinition, TierId};
use crate::genotype::selector::MarkerSelection;
use crate::llm_client::{CompletionService, LlmError};
use crate::models::report::GeneratedReport;
use crate::report::prompt_builder::{build_prompt, build_raw_text_prompt, BuiltPrompt, PromptMode};
use crate::report::prompts::DEMO_MODE_REPORT;

/// Everything one generation call needs. Lives only for the duration of the call.
#[derive(Debug, Clone)]
pub struct ReportRequest<'a> {
    pub tier_id: TierId,
    pub source_file_name: &'a str,
    pub source_file_size_bytes: usize,
    pub selection: &'a MarkerSelection,
    /// Decoded file text; only read in `PromptMode::RawText`.
    pub source_text: Option<&'a str>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No required markers for this tier were found in the file")]
    InsufficientMarkers,

    #[error("Completion service returned no text")]
    EmptyResponse,

    #[error("Completion service call failed: {0}")]
    Upstream(#[from] LlmError),
}

/// A generated report plus how it was produced.
#[derive(Debug, Clone)]
pub struct Generation {
    pub report: GeneratedReport,
    /// True when the placeholder body was returned because no service is configured.
    pub demo_mode: bool,
    pub prompt_truncated: bool,
}

#[derive(Clone)]
pub struct ReportGenerator {
    completion: Option<Arc<dyn CompletionService>>,
    prompt_mode: PromptMode,
    max_prompt_chars: usize,
}

impl ReportGenerator {
    pub fn new(
        completion: Option<Arc<dyn CompletionService>>,
        prompt_mode: PromptMode,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            completion,
            prompt_mode,
            max_prompt_chars,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.completion.is_some()
    }

    pub fn prompt_mode(&self) -> PromptMode {
        self.prompt_mode
    }

    pub async fn generate(
        &self,
        tier: &TierDefinition,
        request: &ReportRequest<'_>,
    ) -> Result<Generation, GenerationError> {
        if request.selection.is_insufficient() {
            return Err(GenerationError::InsufficientMarkers);
        }

        let Some(completion) = &self.completion else {
            debug!(
                "No completion service configured; returning demo report for {}",
                request.source_file_name
            );
            return Ok(Generation {
                report: new_report(tier, request, demo_body(tier, request)),
                demo_mode: true,
                prompt_truncated: false,
            });
        };

        let prompt = self.build(tier, request);
        if prompt.truncated {
            info!(
                "Prompt payload truncated to {} chars for {}",
                self.max_prompt_chars, request.source_file_name
            );
        }

        let text = completion.complete(&prompt.text).await.map_err(|e| {
            error!("Report generation call failed for tier {}: {e}", tier.id);
            GenerationError::Upstream(e)
        })?;

        let body = text.trim();
        if body.is_empty() {
            error!(
                "Completion service returned no text for tier {} ({} prompt chars)",
                tier.id,
                prompt.text.len()
            );
            return Err(GenerationError::EmptyResponse);
        }

        Ok(Generation {
            report: new_report(tier, request, body.to_string()),
            demo_mode: false,
            prompt_truncated: prompt.truncated,
        })
    }

    fn build(&self, tier: &TierDefinition, request: &ReportRequest<'_>) -> BuiltPrompt {
        match (self.prompt_mode, request.source_text) {
            (PromptMode::RawText, Some(text)) => {
                build_raw_text_prompt(tier, text, self.max_prompt_chars)
            }
            _ => build_prompt(tier, request.selection),
        }
    }
}

fn new_report(tier: &TierDefinition, request: &ReportRequest<'_>, body_text: String) -> GeneratedReport {
    GeneratedReport {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        tier_id: request.tier_id,
        tier_label: tier.label.to_string(),
        source_file_name: request.source_file_name.to_string(),
        body_text,
    }
}

fn demo_body(tier: &TierDefinition, request: &ReportRequest<'_>) -> String {
    // The file name is caller-controlled, so it goes in last.
    DEMO_MODE_REPORT
        .replace("{size_kb}", &size_kb(request.source_file_size_bytes).to_string())
        .replace("{matched}", &request.selection.matched_count().to_string())
        .replace("{required}", &tier.required_markers.len().to_string())
        .replace("{tier_label}", tier.label)
        .replace("{file_name}", request.source_file_name)
}

/// Rounded kilobytes, as shown to users.
pub fn size_kb(bytes: usize) -> usize {
    (bytes + 512) / 1024
}
