use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use khata_core::{Account, AccountKind, Money, PaymentMode};

use crate::error::ApiError;
use crate::AppState;

#[derive(Deserialize)]
pub struct AccountInput {
    pub name: String,
    pub kind: AccountKind,
    pub account_id: String,
    pub balance: Money,
    pub interest_rate: Decimal,
    pub next_due_date: String,
    pub bank: PaymentMode,
    #[serde(default)]
    pub tenure_months: Option<i64>,
    #[serde(default)]
    pub emi_amount: Option<Money>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl AccountInput {
    fn into_record(self, id: Option<i64>) -> Account {
        Account {
            id,
            name: self.name,
            kind: self.kind,
            account_id: self.account_id,
            balance: self.balance,
            interest_rate: self.interest_rate,
            next_due_date: self.next_due_date,
            bank: self.bank,
            tenure_months: self.tenure_months,
            emi_amount: self.emi_amount,
            comments: self.comments,
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    let accounts = khata_storage::list_accounts(&state.db).await?;
    Ok(Json(accounts))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Account>, ApiError> {
    khata_storage::get_account(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("account"))
}

pub async fn get_by_account_id(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Account>, ApiError> {
    khata_storage::get_account_by_account_id(&state.db, &account_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("account"))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<AccountInput>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let account = khata_storage::create_account(&state.db, &input.into_record(None)).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<AccountInput>,
) -> Result<Json<Account>, ApiError> {
    khata_storage::update_account(&state.db, id, &input.into_record(Some(id)))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("account"))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if khata_storage::delete_account(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("account"))
    }
}
