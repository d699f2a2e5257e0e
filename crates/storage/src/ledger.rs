use chrono::NaiveDate;
use khata_core::{Category, Department, LedgerTransaction, Money, PaymentMode};

use crate::db::{decode_err, DbPool};

type LedgerRow = (
    i64,
    NaiveDate,
    String,
    i64,
    String,
    String,
    String,
    String,
    Option<String>,
    i64,
);

const LEDGER_COLUMNS: &str = "id, date, description, amount_cents, payment_mode, account_id, \
     department, category, comments, external_match";

fn map_row(row: LedgerRow) -> Result<LedgerTransaction, sqlx::Error> {
    Ok(LedgerTransaction {
        id: Some(row.0),
        date: row.1,
        description: row.2,
        amount: Money::from_cents(row.3),
        payment_mode: row.4.parse().map_err(decode_err)?,
        account_id: row.5,
        department: row.6.parse().map_err(decode_err)?,
        category: row.7.parse().map_err(decode_err)?,
        comments: row.8,
        external_match: row.9 != 0,
    })
}

#[derive(Debug, Clone)]
pub struct LedgerFilter {
    pub skip: i64,
    pub limit: i64,
    pub category: Option<Category>,
    pub department: Option<Department>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for LedgerFilter {
    fn default() -> Self {
        LedgerFilter {
            skip: 0,
            limit: 100,
            category: None,
            department: None,
            start_date: None,
            end_date: None,
        }
    }
}

/// Inserts a ledger transaction and moves the owning account's balance by the
/// transaction amount, in one database transaction.
pub async fn create_transaction(
    pool: &DbPool,
    txn: &LedgerTransaction,
) -> Result<LedgerTransaction, sqlx::Error> {
    let mut db_tx = pool.begin().await?;

    let row: (i64,) = sqlx::query_as(
        "INSERT INTO ledger_transactions (date, description, amount_cents, payment_mode, \
         account_id, department, category, comments, external_match) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(txn.date)
    .bind(&txn.description)
    .bind(txn.amount.to_cents())
    .bind(txn.payment_mode.as_str())
    .bind(&txn.account_id)
    .bind(txn.department.as_str())
    .bind(txn.category.as_str())
    .bind(&txn.comments)
    .bind(txn.external_match as i64)
    .fetch_one(&mut *db_tx)
    .await?;

    apply_balance(&mut db_tx, &txn.account_id, txn.amount.to_cents()).await?;
    db_tx.commit().await?;

    Ok(LedgerTransaction {
        id: Some(row.0),
        ..txn.clone()
    })
}

pub async fn get_transaction(
    pool: &DbPool,
    id: i64,
) -> Result<Option<LedgerTransaction>, sqlx::Error> {
    let row = sqlx::query_as::<_, LedgerRow>(&format!(
        "SELECT {LEDGER_COLUMNS} FROM ledger_transactions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(map_row).transpose()
}

pub async fn list_transactions(
    pool: &DbPool,
    filter: &LedgerFilter,
) -> Result<Vec<LedgerTransaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LedgerRow>(&format!(
        "SELECT {LEDGER_COLUMNS} FROM ledger_transactions \
         WHERE (?1 IS NULL OR category = ?1) \
           AND (?2 IS NULL OR department = ?2) \
           AND (?3 IS NULL OR date >= ?3) \
           AND (?4 IS NULL OR date <= ?4) \
         ORDER BY id LIMIT ?5 OFFSET ?6"
    ))
    .bind(filter.category.map(Category::as_str))
    .bind(filter.department.map(Department::as_str))
    .bind(filter.start_date)
    .bind(filter.end_date)
    .bind(filter.limit)
    .bind(filter.skip)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(map_row).collect()
}

/// Rewrites a transaction, reversing the old amount on the old account and
/// applying the new amount on the new one.
pub async fn update_transaction(
    pool: &DbPool,
    id: i64,
    updated: &LedgerTransaction,
) -> Result<Option<LedgerTransaction>, sqlx::Error> {
    let mut db_tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, LedgerRow>(&format!(
        "SELECT {LEDGER_COLUMNS} FROM ledger_transactions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *db_tx)
    .await?;
    let existing = match existing {
        Some(row) => map_row(row)?,
        None => return Ok(None),
    };

    apply_balance(&mut db_tx, &existing.account_id, -existing.amount.to_cents()).await?;

    sqlx::query(
        "UPDATE ledger_transactions SET date = ?, description = ?, amount_cents = ?, \
         payment_mode = ?, account_id = ?, department = ?, category = ?, comments = ?, \
         external_match = ? WHERE id = ?",
    )
    .bind(updated.date)
    .bind(&updated.description)
    .bind(updated.amount.to_cents())
    .bind(updated.payment_mode.as_str())
    .bind(&updated.account_id)
    .bind(updated.department.as_str())
    .bind(updated.category.as_str())
    .bind(&updated.comments)
    .bind(updated.external_match as i64)
    .bind(id)
    .execute(&mut *db_tx)
    .await?;

    apply_balance(&mut db_tx, &updated.account_id, updated.amount.to_cents()).await?;
    db_tx.commit().await?;

    Ok(Some(LedgerTransaction {
        id: Some(id),
        ..updated.clone()
    }))
}

pub async fn delete_transaction(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let mut db_tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, LedgerRow>(&format!(
        "SELECT {LEDGER_COLUMNS} FROM ledger_transactions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *db_tx)
    .await?;
    let existing = match existing {
        Some(row) => map_row(row)?,
        None => return Ok(false),
    };

    apply_balance(&mut db_tx, &existing.account_id, -existing.amount.to_cents()).await?;
    sqlx::query("DELETE FROM ledger_transactions WHERE id = ?")
        .bind(id)
        .execute(&mut *db_tx)
        .await?;
    db_tx.commit().await?;

    Ok(true)
}

/// Range lookup backing the matcher: same date, amount within an inclusive
/// cents tolerance, and the import source's payment-mode tag. Ordered by
/// serial id, which is what "query order" means everywhere else.
pub async fn find_match_candidates(
    pool: &DbPool,
    date: NaiveDate,
    amount_cents: i64,
    tolerance_cents: i64,
    mode: PaymentMode,
) -> Result<Vec<(i64, String)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String)>(
        "SELECT id, description FROM ledger_transactions \
         WHERE date = ? AND amount_cents BETWEEN ? AND ? AND payment_mode = ? \
         ORDER BY id",
    )
    .bind(date)
    .bind(amount_cents - tolerance_cents)
    .bind(amount_cents + tolerance_cents)
    .bind(mode.as_str())
    .fetch_all(pool)
    .await
}

async fn apply_balance(
    db_tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    account_id: &str,
    delta_cents: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE accounts SET balance_cents = balance_cents + ? WHERE account_id = ?")
        .bind(delta_cents)
        .bind(account_id)
        .execute(&mut **db_tx)
        .await?;
    Ok(())
}
