//! Drivers that tie the statement parser and the match engine to storage.

use serde::Serialize;

use khata_core::{ReconcileConfig, StatementEntry};
use khata_import::{parse_statement, select_candidate, FileKind, MatchCandidate, StatementError};
use khata_storage::DbPool;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub new_rows: usize,
    pub duplicate_rows: usize,
    /// Human-readable diagnostics for rows the parser refused.
    pub skipped_rows: Vec<String>,
}

/// Parses an uploaded workbook and stores every entry not already present.
/// Entries are keyed by bank reference number, so re-uploading the same
/// statement (or overlapping date ranges) only counts duplicates.
pub async fn import_statement(
    db: &DbPool,
    bytes: &[u8],
    filename: &str,
) -> Result<ImportSummary, ApiError> {
    let kind = FileKind::from_filename(filename)?;
    let parsed = parse_statement(bytes, kind)?;
    if parsed.entries.is_empty() {
        return Err(StatementError::NoRows.into());
    }

    let skipped_rows = parsed.skipped.iter().map(ToString::to_string).collect();
    let (new_rows, duplicate_rows) = persist_entries(db, &parsed.entries).await?;
    let summary = ImportSummary {
        total_rows: parsed.entries.len(),
        new_rows,
        duplicate_rows,
        skipped_rows,
    };
    tracing::info!(
        total = summary.total_rows,
        new = summary.new_rows,
        duplicates = summary.duplicate_rows,
        "statement import finished"
    );
    Ok(summary)
}

async fn persist_entries(
    db: &DbPool,
    entries: &[StatementEntry],
) -> Result<(usize, usize), ApiError> {
    let mut new_rows = 0;
    let mut duplicate_rows = 0;
    for entry in entries {
        if khata_storage::get_entry_by_ref_no(db, &entry.ref_no)
            .await?
            .is_some()
        {
            duplicate_rows += 1;
            continue;
        }
        khata_storage::insert_entry(db, entry).await?;
        new_rows += 1;
    }
    Ok((new_rows, duplicate_rows))
}

#[derive(Debug, Serialize)]
pub struct ReconcileSummary {
    pub total: usize,
    pub reconciled: usize,
    pub unreconciled: usize,
}

/// Walks every unreconciled statement entry and links it to a ledger
/// transaction on the configured bank channel when one matches by date and
/// amount. Entries with no match stay unreconciled for the next run.
pub async fn reconcile(db: &DbPool, policy: &ReconcileConfig) -> Result<ReconcileSummary, ApiError> {
    let entries = khata_storage::unreconciled_entries(db).await?;
    let mut summary = ReconcileSummary {
        total: entries.len(),
        reconciled: 0,
        unreconciled: 0,
    };

    for entry in &entries {
        let matched = match entry.id {
            Some(entry_id) => match find_match(db, entry, policy).await? {
                Some(txn_id) => {
                    khata_storage::mark_reconciled(db, entry_id, txn_id).await?;
                    true
                }
                None => false,
            },
            None => false,
        };
        if matched {
            summary.reconciled += 1;
        } else {
            summary.unreconciled += 1;
        }
    }

    tracing::info!(
        total = summary.total,
        reconciled = summary.reconciled,
        "reconciliation finished"
    );
    Ok(summary)
}

async fn find_match(
    db: &DbPool,
    entry: &StatementEntry,
    policy: &ReconcileConfig,
) -> Result<Option<i64>, ApiError> {
    let Some(amount) = entry.amount() else {
        return Ok(None);
    };
    let candidates: Vec<MatchCandidate> = khata_storage::find_match_candidates(
        db,
        entry.transaction_date,
        amount.to_cents(),
        policy.tolerance_cents,
        policy.bank_channel,
    )
    .await?
    .into_iter()
    .map(|(id, description)| MatchCandidate { id, description })
    .collect();
    Ok(select_candidate(&entry.description, &candidates).map(|c| c.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use khata_core::{Category, Department, LedgerTransaction, Money, PaymentMode};

    async fn test_db() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = khata_storage::create_db(&dir.path().join("test.db"))
            .await
            .unwrap();
        (dir, pool)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn entry(ref_no: &str, day: u32, description: &str, debit_cents: i64) -> StatementEntry {
        StatementEntry {
            id: None,
            transaction_date: date(day),
            value_date: date(day),
            description: description.to_string(),
            ref_no: ref_no.to_string(),
            debit: Some(Money::from_cents(debit_cents)),
            credit: None,
            balance: Money::from_cents(10_000_00),
            reconciled: false,
            matched_txn: None,
        }
    }

    fn ledger_txn(day: u32, description: &str, cents: i64, mode: PaymentMode) -> LedgerTransaction {
        LedgerTransaction {
            id: None,
            date: date(day),
            description: description.to_string(),
            amount: Money::from_cents(cents),
            payment_mode: mode,
            account_id: "GL01".to_string(),
            department: Department::Serendipity,
            category: Category::Maintenance,
            comments: None,
            external_match: false,
        }
    }

    fn policy() -> ReconcileConfig {
        ReconcileConfig {
            tolerance_cents: 1,
            bank_channel: PaymentMode::Icici090,
        }
    }

    #[tokio::test]
    async fn persisting_twice_counts_duplicates() {
        let (_dir, db) = test_db().await;
        let entries = vec![
            entry("REF-1", 5, "electricity bill", 2_540_00),
            entry("REF-2", 6, "staff salary", 18_000_00),
        ];

        assert_eq!(persist_entries(&db, &entries).await.unwrap(), (2, 0));
        assert_eq!(persist_entries(&db, &entries).await.unwrap(), (0, 2));

        let mut overlapping = entries.clone();
        overlapping.push(entry("REF-3", 7, "rent", 30_000_00));
        assert_eq!(persist_entries(&db, &overlapping).await.unwrap(), (1, 2));
    }

    #[tokio::test]
    async fn reconcile_links_matching_entries() {
        let (_dir, db) = test_db().await;
        let txn = khata_storage::create_transaction(
            &db,
            &ledger_txn(5, "electricity bill", 2_540_00, PaymentMode::Icici090),
        )
        .await
        .unwrap();
        // Same amount and date but on a different channel; must not match.
        khata_storage::create_transaction(
            &db,
            &ledger_txn(5, "electricity bill", 2_540_00, PaymentMode::Cash),
        )
        .await
        .unwrap();

        persist_entries(
            &db,
            &[
                entry("REF-1", 5, "BIL/electricity bill/JAN", 2_540_00),
                entry("REF-2", 9, "no ledger counterpart", 77_00),
            ],
        )
        .await
        .unwrap();

        let summary = reconcile(&db, &policy()).await.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.reconciled, 1);
        assert_eq!(summary.unreconciled, 1);

        let linked = khata_storage::get_entry_by_ref_no(&db, "REF-1")
            .await
            .unwrap()
            .unwrap();
        assert!(linked.reconciled);
        assert_eq!(linked.matched_txn, txn.id);

        // A second run only sees the leftover entry.
        let again = reconcile(&db, &policy()).await.unwrap();
        assert_eq!(again.total, 1);
        assert_eq!(again.reconciled, 0);
    }

    #[tokio::test]
    async fn reconcile_respects_amount_tolerance() {
        let (_dir, db) = test_db().await;
        khata_storage::create_transaction(
            &db,
            &ledger_txn(5, "chit payment", 500_01, PaymentMode::Icici090),
        )
        .await
        .unwrap();

        persist_entries(
            &db,
            &[
                entry("REF-NEAR", 5, "chit payment", 500_00),
                entry("REF-FAR", 5, "chit payment", 499_99),
            ],
        )
        .await
        .unwrap();

        let summary = reconcile(&db, &policy()).await.unwrap();
        assert_eq!(summary.reconciled, 1);
        assert_eq!(summary.unreconciled, 1);

        let near = khata_storage::get_entry_by_ref_no(&db, "REF-NEAR")
            .await
            .unwrap()
            .unwrap();
        assert!(near.reconciled);
        let far = khata_storage::get_entry_by_ref_no(&db, "REF-FAR")
            .await
            .unwrap()
            .unwrap();
        assert!(!far.reconciled);
    }

    #[tokio::test]
    async fn reconcile_prefers_description_overlap_between_candidates() {
        let (_dir, db) = test_db().await;
        khata_storage::create_transaction(
            &db,
            &ledger_txn(5, "warehouse rent", 9_000_00, PaymentMode::Icici090),
        )
        .await
        .unwrap();
        let wanted = khata_storage::create_transaction(
            &db,
            &ledger_txn(5, "generator diesel", 9_000_00, PaymentMode::Icici090),
        )
        .await
        .unwrap();

        persist_entries(&db, &[entry("REF-1", 5, "UPI 428871 diesel purchase", 9_000_00)])
            .await
            .unwrap();
        reconcile(&db, &policy()).await.unwrap();

        let linked = khata_storage::get_entry_by_ref_no(&db, "REF-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(linked.matched_txn, wanted.id);
    }
}
