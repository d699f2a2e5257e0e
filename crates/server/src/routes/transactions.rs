use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use khata_core::{Category, Department, LedgerTransaction, Money, PaymentMode};
use khata_storage::LedgerFilter;

use crate::error::ApiError;
use crate::AppState;

#[derive(Deserialize)]
pub struct TransactionInput {
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
    pub external_match: bool,
}

impl TransactionInput {
    fn into_record(self, id: Option<i64>) -> LedgerTransaction {
        LedgerTransaction {
            id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            payment_mode: self.payment_mode,
            account_id: self.account_id,
            department: self.department,
            category: self.category,
            comments: self.comments,
            external_match: self.external_match,
        }
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub category: Option<Category>,
    pub department: Option<Department>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn default_limit() -> i64 {
    100
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<LedgerTransaction>>, ApiError> {
    let filter = LedgerFilter {
        skip: params.skip,
        limit: params.limit,
        category: params.category,
        department: params.department,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let txns = khata_storage::list_transactions(&state.db, &filter).await?;
    Ok(Json(txns))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LedgerTransaction>, ApiError> {
    khata_storage::get_transaction(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("transaction"))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<TransactionInput>,
) -> Result<(StatusCode, Json<LedgerTransaction>), ApiError> {
    let txn = khata_storage::create_transaction(&state.db, &input.into_record(None)).await?;
    Ok((StatusCode::CREATED, Json(txn)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<TransactionInput>,
) -> Result<Json<LedgerTransaction>, ApiError> {
    khata_storage::update_transaction(&state.db, id, &input.into_record(Some(id)))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("transaction"))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if khata_storage::delete_transaction(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("transaction"))
    }
}
