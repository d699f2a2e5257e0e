use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use khata_core::{Category, Department, FuturePrediction, Money, PaymentMode};

use crate::error::ApiError;
use crate::AppState;

#[derive(Deserialize)]
pub struct PredictionInput {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub payment_mode: PaymentMode,
    pub account_id: String,
    pub department: Department,
    pub category: Category,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub paid: bool,
}

impl PredictionInput {
    fn into_record(self, id: Option<i64>) -> FuturePrediction {
        FuturePrediction {
            id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            payment_mode: self.payment_mode,
            account_id: self.account_id,
            department: self.department,
            category: self.category,
            comments: self.comments,
            paid: self.paid,
        }
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub paid: Option<bool>,
}

fn default_limit() -> i64 {
    100
}

#[derive(Deserialize)]
pub struct UnpaidParams {
    /// Defaults to today; the digest job passes nothing.
    pub from: Option<NaiveDate>,
    #[serde(default = "default_unpaid_limit")]
    pub limit: i64,
}

fn default_unpaid_limit() -> i64 {
    khata_notify::DIGEST_LIMIT
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<FuturePrediction>>, ApiError> {
    let predictions =
        khata_storage::list_predictions(&state.db, params.paid, params.skip, params.limit).await?;
    Ok(Json(predictions))
}

pub async fn unpaid(
    State(state): State<AppState>,
    Query(params): Query<UnpaidParams>,
) -> Result<Json<Vec<FuturePrediction>>, ApiError> {
    let from = params
        .from
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let predictions = khata_storage::unpaid_from(&state.db, from, params.limit).await?;
    Ok(Json(predictions))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FuturePrediction>, ApiError> {
    khata_storage::get_prediction(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("prediction"))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<PredictionInput>,
) -> Result<(StatusCode, Json<FuturePrediction>), ApiError> {
    let prediction = khata_storage::create_prediction(&state.db, &input.into_record(None)).await?;
    Ok((StatusCode::CREATED, Json(prediction)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PredictionInput>,
) -> Result<Json<FuturePrediction>, ApiError> {
    khata_storage::update_prediction(&state.db, id, &input.into_record(Some(id)))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("prediction"))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FuturePrediction>, ApiError> {
    khata_storage::mark_paid(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("prediction"))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if khata_storage::delete_prediction(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("prediction"))
    }
}
