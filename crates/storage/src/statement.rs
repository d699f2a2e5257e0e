use chrono::NaiveDate;
use khata_core::{Money, StatementEntry};

use crate::db::DbPool;

type EntryRow = (
    i64,
    NaiveDate,
    NaiveDate,
    String,
    String,
    Option<i64>,
    Option<i64>,
    i64,
    i64,
    Option<i64>,
);

const ENTRY_COLUMNS: &str = "id, transaction_date, value_date, description, ref_no, \
     debit_cents, credit_cents, balance_cents, reconciled, matched_txn";

fn map_row(row: EntryRow) -> StatementEntry {
    StatementEntry {
        id: Some(row.0),
        transaction_date: row.1,
        value_date: row.2,
        description: row.3,
        ref_no: row.4,
        debit: row.5.map(Money::from_cents),
        credit: row.6.map(Money::from_cents),
        balance: Money::from_cents(row.7),
        reconciled: row.8 != 0,
        matched_txn: row.9,
    }
}

/// Point lookup by the bank's reference number; the dedup key for uploads.
pub async fn get_entry_by_ref_no(
    pool: &DbPool,
    ref_no: &str,
) -> Result<Option<StatementEntry>, sqlx::Error> {
    let row = sqlx::query_as::<_, EntryRow>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM statement_entries WHERE ref_no = ?"
    ))
    .bind(ref_no)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(map_row))
}

pub async fn insert_entry(
    pool: &DbPool,
    entry: &StatementEntry,
) -> Result<StatementEntry, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO statement_entries (transaction_date, value_date, description, ref_no, \
         debit_cents, credit_cents, balance_cents, reconciled, matched_txn) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(entry.transaction_date)
    .bind(entry.value_date)
    .bind(&entry.description)
    .bind(&entry.ref_no)
    .bind(entry.debit.map(Money::to_cents))
    .bind(entry.credit.map(Money::to_cents))
    .bind(entry.balance.to_cents())
    .bind(entry.reconciled as i64)
    .bind(entry.matched_txn)
    .fetch_one(pool)
    .await?;

    Ok(StatementEntry {
        id: Some(row.0),
        ..entry.clone()
    })
}

pub async fn list_entries(
    pool: &DbPool,
    reconciled: Option<bool>,
    skip: i64,
    limit: i64,
) -> Result<Vec<StatementEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EntryRow>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM statement_entries \
         WHERE (?1 IS NULL OR reconciled = ?1) ORDER BY id LIMIT ?2 OFFSET ?3"
    ))
    .bind(reconciled.map(|r| r as i64))
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(map_row).collect())
}

/// Bulk fetch for the reconciliation driver.
pub async fn unreconciled_entries(pool: &DbPool) -> Result<Vec<StatementEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EntryRow>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM statement_entries WHERE reconciled = 0 ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(map_row).collect())
}

/// The single mutation an entry ever receives: reconciled flag set, matched
/// ledger id stored. The ledger row itself is never touched.
pub async fn mark_reconciled(pool: &DbPool, id: i64, txn_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE statement_entries SET reconciled = 1, matched_txn = ? WHERE id = ?")
        .bind(txn_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_db;
    use crate::ledger::create_transaction;
    use khata_core::{Category, Department, LedgerTransaction, PaymentMode};

    async fn ledger_txn_id(pool: &DbPool) -> i64 {
        let txn = LedgerTransaction {
            id: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            description: "inward transfer".to_string(),
            amount: Money::from_cents(50000),
            payment_mode: PaymentMode::Icici090,
            account_id: "ICICI090".to_string(),
            department: Department::Serendipity,
            category: Category::Income,
            comments: None,
            external_match: false,
        };
        create_transaction(pool, &txn).await.unwrap().id.unwrap()
    }

    fn entry(ref_no: &str, credit_cents: i64) -> StatementEntry {
        StatementEntry {
            id: None,
            transaction_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            value_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            description: "NEFT/inward".to_string(),
            ref_no: ref_no.to_string(),
            debit: None,
            credit: Some(Money::from_cents(credit_cents)),
            balance: Money::from_cents(10000000),
            reconciled: false,
            matched_txn: None,
        }
    }

    #[tokio::test]
    async fn ref_no_lookup_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("test.db")).await.unwrap();

        insert_entry(&pool, &entry("857491", 50000)).await.unwrap();
        let found = get_entry_by_ref_no(&pool, "857491").await.unwrap().unwrap();
        assert_eq!(found.credit, Some(Money::from_cents(50000)));
        assert_eq!(found.debit, None);
        assert!(get_entry_by_ref_no(&pool, "000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mark_reconciled_removes_from_unreconciled_set() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("test.db")).await.unwrap();

        let txn_id = ledger_txn_id(&pool).await;
        let a = insert_entry(&pool, &entry("111", 50000)).await.unwrap();
        insert_entry(&pool, &entry("222", 70000)).await.unwrap();

        assert_eq!(unreconciled_entries(&pool).await.unwrap().len(), 2);

        mark_reconciled(&pool, a.id.unwrap(), txn_id).await.unwrap();
        let remaining = unreconciled_entries(&pool).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].ref_no, "222");

        let reconciled = get_entry_by_ref_no(&pool, "111").await.unwrap().unwrap();
        assert!(reconciled.reconciled);
        assert_eq!(reconciled.matched_txn, Some(txn_id));
    }

    #[tokio::test]
    async fn list_filters_by_reconciled_flag() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("test.db")).await.unwrap();

        let txn_id = ledger_txn_id(&pool).await;
        let a = insert_entry(&pool, &entry("111", 50000)).await.unwrap();
        insert_entry(&pool, &entry("222", 70000)).await.unwrap();
        mark_reconciled(&pool, a.id.unwrap(), txn_id).await.unwrap();

        let reconciled = list_entries(&pool, Some(true), 0, 100).await.unwrap();
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].ref_no, "111");

        let all = list_entries(&pool, None, 0, 100).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
