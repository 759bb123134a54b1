//! Axum route handlers for the Report API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use bytes::{Bytes, BytesMut};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::{self, TierId, CATALOG_VERSION};
use crate::errors::AppError;
use crate::models::report::GeneratedReport;
use crate::report::upload::{process_upload, FailureKind, UploadInput, UploadOutcome};
use crate::state::AppState;

/// Multipart field names accepted as the tier selector, in order of preference.
const TIER_FIELDS: [&str; 3] = ["package", "packageId", "tier"];
const DEFAULT_FILE_NAME: &str = "upload.txt";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    pub id: TierId,
    pub label: &'static str,
    pub marker_count: usize,
    pub sections: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCatalogResponse {
    pub catalog_version: &'static str,
    pub tiers: Vec<TierSummary>,
}

/// Fields pulled out of the multipart upload form.
struct UploadForm {
    file_name: String,
    bytes: Bytes,
    tier_selector: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/tiers
pub async fn handle_list_tiers() -> Json<TierCatalogResponse> {
    let tiers = catalog::all_tiers()
        .iter()
        .map(|t| TierSummary {
            id: t.id,
            label: t.label,
            marker_count: t.required_markers.len(),
            sections: t.sections.iter().map(|s| s.title).collect(),
        })
        .collect();

    Json(TierCatalogResponse {
        catalog_version: CATALOG_VERSION,
        tiers,
    })
}

/// POST /api/v1/reports/upload
///
/// Multipart form: `file` (raw genotype export) plus an optional tier selector.
/// Always answers with an `UploadOutcome`; the status code reflects `failure`.
pub async fn handle_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadOutcome>), AppError> {
    let limits = UploadLimits {
        max_file_bytes: state.config.max_upload_bytes,
        content_length: content_length(&headers),
    };
    let form = read_upload_form(multipart, &limits).await?;

    let outcome = process_upload(
        &state.generator,
        &state.store,
        UploadInput {
            file_name: &form.file_name,
            bytes: &form.bytes,
            tier_selector: form.tier_selector.as_deref(),
        },
        state.config.strict_tiers,
    )
    .await;

    Ok((outcome_status(&outcome), Json(outcome)))
}

/// GET /api/v1/reports
///
/// Stored reports, newest first.
pub async fn handle_list_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<GeneratedReport>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// GET /api/v1/reports/:id
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GeneratedReport>, AppError> {
    let report = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))?;
    Ok(Json(report))
}

/// DELETE /api/v1/reports
pub async fn handle_clear_reports(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Size limits applied while the multipart body is read.
struct UploadLimits {
    max_file_bytes: usize,
    /// Declared request size, used to report how big a rejected upload was.
    content_length: Option<usize>,
}

impl UploadLimits {
    fn too_large(&self, seen_bytes: usize) -> AppError {
        let observed = self.content_length.unwrap_or(0).max(seen_bytes);
        AppError::PayloadTooLarge(format!(
            "This service currently supports files up to {:.0} MB. Your file is ~{:.1} MB. Try a smaller export.",
            megabytes(self.max_file_bytes),
            megabytes(observed)
        ))
    }

    /// Body-limit rejections from the extractor get the same message as the file guard.
    fn read_error(&self, err: MultipartError, seen_bytes: usize) -> AppError {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            self.too_large(seen_bytes)
        } else {
            AppError::Multipart(err)
        }
    }
}

async fn read_upload_form(
    mut multipart: Multipart,
    limits: &UploadLimits,
) -> Result<UploadForm, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut selectors: Vec<(usize, String)> = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| limits.read_error(e, 0))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let file_name = field
                .file_name()
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_FILE_NAME)
                .to_string();

            // Stop reading as soon as the file passes the limit.
            let mut buf = BytesMut::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| limits.read_error(e, buf.len()))?
            {
                if buf.len() + chunk.len() > limits.max_file_bytes {
                    return Err(limits.too_large(buf.len() + chunk.len()));
                }
                buf.extend_from_slice(&chunk);
            }
            file = Some((file_name, buf.freeze()));
        } else if let Some(rank) = TIER_FIELDS.iter().position(|f| *f == name) {
            let value = field.text().await.map_err(|e| limits.read_error(e, 0))?;
            selectors.push((rank, value));
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::Validation("No DNA file found in the request.".to_string()))?;

    selectors.sort_by_key(|(rank, _)| *rank);
    let tier_selector = selectors
        .into_iter()
        .map(|(_, value)| value)
        .find(|v| !v.trim().is_empty());

    Ok(UploadForm {
        file_name,
        bytes,
        tier_selector,
    })
}

fn outcome_status(outcome: &UploadOutcome) -> StatusCode {
    match outcome.failure {
        None => StatusCode::OK,
        Some(FailureKind::UnknownTier) => StatusCode::BAD_REQUEST,
        Some(FailureKind::InsufficientMarkers) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(FailureKind::EmptyResponse) | Some(FailureKind::Upstream) => StatusCode::BAD_GATEWAY,
    }
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn megabytes(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
