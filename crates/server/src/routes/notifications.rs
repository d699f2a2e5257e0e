use axum::extract::State;
use axum::Json;
use serde::Serialize;

use khata_notify::{upcoming_payments_message, TelegramNotifier, DIGEST_LIMIT};

use crate::error::ApiError;
use crate::AppState;

#[derive(Serialize)]
pub struct DigestOutcome {
    pub sent: bool,
    pub payments: usize,
}

/// Pushes the upcoming-payments digest to the configured Telegram chat.
/// With nothing unpaid on the horizon no message is sent at all.
pub async fn send_digest(State(state): State<AppState>) -> Result<Json<DigestOutcome>, ApiError> {
    let telegram = state
        .config
        .telegram
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("telegram is not configured".to_string()))?;

    let today = chrono::Local::now().date_naive();
    let payments = khata_storage::unpaid_from(&state.db, today, DIGEST_LIMIT).await?;
    let outcome = match upcoming_payments_message(&payments) {
        Some(message) => {
            TelegramNotifier::new(telegram)
                .send_message(&message)
                .await?;
            DigestOutcome {
                sent: true,
                payments: payments.len(),
            }
        }
        None => DigestOutcome {
            sent: false,
            payments: 0,
        },
    };
    Ok(Json(outcome))
}
