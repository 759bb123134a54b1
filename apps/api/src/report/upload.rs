//! Upload pipeline — the boundary between the report core and its callers.
//!
//! Flow: resolve tier → parse file → select markers → generate → store.
//!
//! Never returns an error: every terminal condition becomes an `UploadOutcome` with
//! `ok: false` and a user-facing message. Upstream causes are logged, not exposed.

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::catalog::{self, TierDefinition, TierId};
use crate::errors::ErrorBody;
use crate::genotype::parser::parse_genotype_file;
use crate::genotype::selector::select_markers;
use crate::report::generator::{GenerationError, ReportGenerator, ReportRequest};
use crate::report::prompt_builder::PromptMode;
use crate::report::store::ReportStore;

/// A received genotype file and the tier selector that came with it.
#[derive(Debug, Clone)]
pub struct UploadInput<'a> {
    pub file_name: &'a str,
    pub bytes: &'a [u8],
    pub tier_selector: Option<&'a str>,
}

/// Why an upload did not produce a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnknownTier,
    InsufficientMarkers,
    EmptyResponse,
    Upstream,
}

impl FailureKind {
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::UnknownTier => "UNKNOWN_TIER",
            FailureKind::InsufficientMarkers => "INSUFFICIENT_MARKERS",
            FailureKind::EmptyResponse => "EMPTY_RESPONSE",
            FailureKind::Upstream => "UPSTREAM_ERROR",
        }
    }
}

/// Uniform result returned to the caller for every upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub ok: bool,
    pub tier_id: Option<TierId>,
    pub source_file_name: String,
    pub source_file_size_bytes: usize,
    pub matched_marker_count: usize,
    pub total_lines: usize,
    pub report_id: Option<Uuid>,
    pub body_text: Option<String>,
    pub error: Option<ErrorBody>,
    pub failure: Option<FailureKind>,
    pub demo_mode: bool,
    pub prompt_truncated: bool,
}

impl UploadOutcome {
    fn new(input: &UploadInput<'_>, tier_id: Option<TierId>) -> Self {
        Self {
            ok: false,
            tier_id,
            source_file_name: input.file_name.to_string(),
            source_file_size_bytes: input.bytes.len(),
            matched_marker_count: 0,
            total_lines: 0,
            report_id: None,
            body_text: None,
            error: None,
            failure: None,
            demo_mode: false,
            prompt_truncated: false,
        }
    }

    fn fail(mut self, kind: FailureKind, message: String) -> Self {
        self.ok = false;
        self.failure = Some(kind);
        self.error = Some(ErrorBody {
            code: kind.code(),
            message,
        });
        self
    }
}

/// Resolves the tier selector. Unknown selectors fall back to the lowest tier unless
/// `strict` is set; a missing selector always means the lowest tier.
pub fn resolve_tier(
    selector: Option<&str>,
    strict: bool,
) -> Result<&'static TierDefinition, catalog::UnknownTierError> {
    match selector.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(catalog::lookup(TierId::Snapshot)),
        Some(s) if strict => catalog::lookup_str(s),
        Some(s) => {
            let id = TierId::parse_lenient(Some(s));
            if s.parse::<TierId>().is_err() {
                warn!("Unknown tier selector '{s}', defaulting to {id}");
            }
            Ok(catalog::lookup(id))
        }
    }
}

pub async fn process_upload(
    generator: &ReportGenerator,
    store: &ReportStore,
    input: UploadInput<'_>,
    strict_tiers: bool,
) -> UploadOutcome {
    let tier = match resolve_tier(input.tier_selector, strict_tiers) {
        Ok(tier) => tier,
        Err(e) => {
            return UploadOutcome::new(&input, None)
                .fail(FailureKind::UnknownTier, format!("{e}."));
        }
    };

    let mut outcome = UploadOutcome::new(&input, Some(tier.id));

    let file = parse_genotype_file(input.bytes);
    let selection = select_markers(&file, tier);
    outcome.total_lines = file.total_lines;
    outcome.matched_marker_count = selection.matched_count();

    if file.is_empty() {
        warn!(
            "No genotype records found in '{}' ({} lines)",
            input.file_name, file.total_lines
        );
    }

    info!(
        "Parsed '{}': {} lines, {} markers; matched {}/{} for tier {}",
        input.file_name,
        file.total_lines,
        file.len(),
        selection.matched_count(),
        tier.required_markers.len(),
        tier.id
    );

    let source_text = (generator.prompt_mode() == PromptMode::RawText)
        .then(|| String::from_utf8_lossy(input.bytes).into_owned());

    let request = ReportRequest {
        tier_id: tier.id,
        source_file_name: input.file_name,
        source_file_size_bytes: input.bytes.len(),
        selection: &selection,
        source_text: source_text.as_deref(),
    };

    let generation = match generator.generate(tier, &request).await {
        Ok(generation) => generation,
        Err(e) => {
            let (kind, message) = describe_failure(&e, tier, input.file_name);
            return outcome.fail(kind, message);
        }
    };

    if let Err(e) = store.append(&generation.report).await {
        error!(
            "Failed to persist report {} for '{}': {e}",
            generation.report.id, input.file_name
        );
    }

    info!(
        "Generated {} report {} for '{}'{}",
        tier.id,
        generation.report.id,
        input.file_name,
        if generation.demo_mode { " (demo mode)" } else { "" }
    );

    outcome.ok = true;
    outcome.report_id = Some(generation.report.id);
    outcome.demo_mode = generation.demo_mode;
    outcome.prompt_truncated = generation.prompt_truncated;
    outcome.body_text = Some(generation.report.body_text);
    outcome
}

fn describe_failure(
    err: &GenerationError,
    tier: &TierDefinition,
    file_name: &str,
) -> (FailureKind, String) {
    match err {
        GenerationError::InsufficientMarkers => (
            FailureKind::InsufficientMarkers,
            format!(
                "None of the {} markers used by the {} report were found in \"{}\". \
                Make sure this is a raw genotype export (rsid, chromosome, position, genotype).",
                tier.required_markers.len(),
                tier.label,
                file_name
            ),
        ),
        GenerationError::EmptyResponse => (
            FailureKind::EmptyResponse,
            "The AI model did not return any text. Please try again with a smaller file or later."
                .to_string(),
        ),
        GenerationError::Upstream(_) => (
            FailureKind::Upstream,
            "Report generation is temporarily unavailable. Please try again later.".to_string(),
        ),
    }
}
