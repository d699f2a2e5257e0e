use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;

use khata_core::StatementEntry;

use crate::error::ApiError;
use crate::ingest::{self, ImportSummary, ReconcileSummary};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub reconciled: Option<bool>,
}

fn default_limit() -> i64 {
    100
}

/// Accepts a multipart upload with a single `file` field holding the bank
/// workbook. The filename decides the decoder.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let summary = ingest::import_statement(&state.db, &bytes, &filename).await?;
        return Ok(Json(summary));
    }
    Err(ApiError::BadRequest("missing file field".to_string()))
}

pub async fn reconcile(
    State(state): State<AppState>,
) -> Result<Json<ReconcileSummary>, ApiError> {
    let summary = ingest::reconcile(&state.db, &state.config.reconcile).await?;
    Ok(Json(summary))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<StatementEntry>>, ApiError> {
    let entries =
        khata_storage::list_entries(&state.db, params.reconciled, params.skip, params.limit)
            .await?;
    Ok(Json(entries))
}
