pub mod accounts;
pub mod db;
pub mod future;
pub mod ledger;
pub mod statement;

pub use accounts::{
    create_account, delete_account, get_account, get_account_by_account_id, list_accounts,
    update_account,
};
pub use db::{create_db, DbPool};
pub use future::{
    create_prediction, delete_prediction, get_prediction, list_predictions, mark_paid,
    unpaid_from, update_prediction,
};
pub use ledger::{
    create_transaction, delete_transaction, find_match_candidates, get_transaction,
    list_transactions, update_transaction, LedgerFilter,
};
pub use statement::{
    get_entry_by_ref_no, insert_entry, list_entries, mark_reconciled, unreconciled_entries,
};
