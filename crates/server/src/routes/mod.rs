pub mod accounts;
pub mod future;
pub mod notifications;
pub mod statements;
pub mod transactions;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Workbook uploads run a few megabytes; leave generous headroom.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/v1/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/api/v1/transactions/{id}",
            get(transactions::get_one)
                .put(transactions::update)
                .delete(transactions::remove),
        )
        .route("/api/v1/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/api/v1/accounts/{id}",
            get(accounts::get_one)
                .put(accounts::update)
                .delete(accounts::remove),
        )
        .route(
            "/api/v1/accounts/by-acc-id/{account_id}",
            get(accounts::get_by_account_id),
        )
        .route("/api/v1/future", get(future::list).post(future::create))
        .route("/api/v1/future/unpaid", get(future::unpaid))
        .route(
            "/api/v1/future/{id}",
            get(future::get_one)
                .put(future::update)
                .delete(future::remove),
        )
        .route("/api/v1/future/{id}/paid", post(future::mark_paid))
        .route("/api/v1/bank-statements", get(statements::list))
        .route("/api/v1/bank-statements/upload", post(statements::upload))
        .route(
            "/api/v1/bank-statements/reconcile",
            post(statements::reconcile),
        )
        .route(
            "/api/v1/notifications/send",
            post(notifications::send_digest),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
