use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;

pub type DbPool = Pool<Sqlite>;

/// Opens (creating if missing) the bookkeeping database. A single connection
/// keeps ledger writes serialized; WAL keeps readers unblocked.
pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ledger_transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            payment_mode TEXT NOT NULL,
            account_id TEXT NOT NULL,
            department TEXT NOT NULL,
            category TEXT NOT NULL,
            comments TEXT,
            external_match INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            account_id TEXT NOT NULL UNIQUE,
            balance_cents INTEGER NOT NULL DEFAULT 0,
            interest_rate TEXT NOT NULL DEFAULT '0',
            next_due_date TEXT NOT NULL DEFAULT '',
            bank TEXT NOT NULL,
            tenure_months INTEGER,
            emi_cents INTEGER,
            comments TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS future_predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            payment_mode TEXT NOT NULL,
            account_id TEXT NOT NULL,
            department TEXT NOT NULL,
            category TEXT NOT NULL,
            comments TEXT,
            paid INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS statement_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            transaction_date TEXT NOT NULL,
            value_date TEXT NOT NULL,
            description TEXT NOT NULL,
            ref_no TEXT NOT NULL,
            debit_cents INTEGER,
            credit_cents INTEGER,
            balance_cents INTEGER NOT NULL,
            reconciled INTEGER NOT NULL DEFAULT 0,
            matched_txn INTEGER REFERENCES ledger_transactions(id),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_statement_ref_no ON statement_entries(ref_no)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ledger_date_mode ON ledger_transactions(date, payment_mode)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Stored labels are written by this crate, so a bad one is data corruption,
/// surfaced as a decode error rather than a silent fallback.
pub(crate) fn decode_err<E>(e: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(e))
}
