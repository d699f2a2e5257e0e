use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// One row imported from a bank statement. Created in bulk during upload,
/// mutated at most once when the matcher links it to a ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementEntry {
    pub id: Option<i64>,
    pub transaction_date: NaiveDate,
    pub value_date: NaiveDate,
    pub description: String,
    /// Bank-assigned cheque/UPI/transaction number; the sole dedup key.
    pub ref_no: String,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
    pub balance: Money,
    pub reconciled: bool,
    pub matched_txn: Option<i64>,
}

impl StatementEntry {
    /// Whichever of debit/credit is present. The parser guarantees they are
    /// mutually exclusive, so this is the row's single amount.
    pub fn amount(&self) -> Option<Money> {
        self.debit.or(self.credit)
    }
}
