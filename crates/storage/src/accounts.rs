use khata_core::{Account, Money};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::{decode_err, DbPool};

type AccountRow = (
    i64,
    String,
    String,
    String,
    i64,
    String,
    String,
    String,
    Option<i64>,
    Option<i64>,
    Option<String>,
);

const ACCOUNT_COLUMNS: &str = "id, name, kind, account_id, balance_cents, interest_rate, \
     next_due_date, bank, tenure_months, emi_cents, comments";

fn map_row(row: AccountRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: Some(row.0),
        name: row.1,
        kind: row.2.parse().map_err(decode_err)?,
        account_id: row.3,
        balance: Money::from_cents(row.4),
        interest_rate: Decimal::from_str(&row.5).map_err(decode_err)?,
        next_due_date: row.6,
        bank: row.7.parse().map_err(decode_err)?,
        tenure_months: row.8,
        emi_amount: row.9.map(Money::from_cents),
        comments: row.10,
    })
}

pub async fn create_account(pool: &DbPool, account: &Account) -> Result<Account, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO accounts (name, kind, account_id, balance_cents, interest_rate, \
         next_due_date, bank, tenure_months, emi_cents, comments) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&account.name)
    .bind(account.kind.as_str())
    .bind(&account.account_id)
    .bind(account.balance.to_cents())
    .bind(account.interest_rate.to_string())
    .bind(&account.next_due_date)
    .bind(account.bank.as_str())
    .bind(account.tenure_months)
    .bind(account.emi_amount.map(Money::to_cents))
    .bind(&account.comments)
    .fetch_one(pool)
    .await?;

    Ok(Account {
        id: Some(row.0),
        ..account.clone()
    })
}

pub async fn get_account(pool: &DbPool, id: i64) -> Result<Option<Account>, sqlx::Error> {
    let row = sqlx::query_as::<_, AccountRow>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(map_row).transpose()
}

pub async fn get_account_by_account_id(
    pool: &DbPool,
    account_id: &str,
) -> Result<Option<Account>, sqlx::Error> {
    let row = sqlx::query_as::<_, AccountRow>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?"
    ))
    .bind(account_id)
    .fetch_optional(pool)
    .await?;
    row.map(map_row).transpose()
}

pub async fn list_accounts(pool: &DbPool) -> Result<Vec<Account>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AccountRow>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(map_row).collect()
}

pub async fn update_account(
    pool: &DbPool,
    id: i64,
    account: &Account,
) -> Result<Option<Account>, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE accounts SET name = ?, kind = ?, account_id = ?, balance_cents = ?, \
         interest_rate = ?, next_due_date = ?, bank = ?, tenure_months = ?, emi_cents = ?, \
         comments = ? WHERE id = ?",
    )
    .bind(&account.name)
    .bind(account.kind.as_str())
    .bind(&account.account_id)
    .bind(account.balance.to_cents())
    .bind(account.interest_rate.to_string())
    .bind(&account.next_due_date)
    .bind(account.bank.as_str())
    .bind(account.tenure_months)
    .bind(account.emi_amount.map(Money::to_cents))
    .bind(&account.comments)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(Account {
        id: Some(id),
        ..account.clone()
    }))
}

pub async fn delete_account(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_db;
    use khata_core::{AccountKind, PaymentMode};

    fn loan_account() -> Account {
        Account {
            id: None,
            name: "Gold loan".to_string(),
            kind: AccountKind::Emi,
            account_id: "GL01".to_string(),
            balance: Money::from_cents(-25000000),
            interest_rate: Decimal::new(125, 2), // 1.25% monthly
            next_due_date: "5".to_string(),
            bank: PaymentMode::Sbi,
            tenure_months: Some(24),
            emi_amount: Some(Money::from_cents(1200000)),
            comments: Some("jewellery pledge".to_string()),
        }
    }

    #[tokio::test]
    async fn round_trips_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("test.db")).await.unwrap();

        let created = create_account(&pool, &loan_account()).await.unwrap();
        let fetched = get_account(&pool, created.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Gold loan");
        assert_eq!(fetched.kind, AccountKind::Emi);
        assert_eq!(fetched.balance, Money::from_cents(-25000000));
        assert_eq!(fetched.interest_rate, Decimal::new(125, 2));
        assert_eq!(fetched.tenure_months, Some(24));
        assert_eq!(fetched.emi_amount, Some(Money::from_cents(1200000)));

        let by_acc = get_account_by_account_id(&pool, "GL01").await.unwrap();
        assert!(by_acc.is_some());
    }

    #[tokio::test]
    async fn duplicate_account_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("test.db")).await.unwrap();

        create_account(&pool, &loan_account()).await.unwrap();
        assert!(create_account(&pool, &loan_account()).await.is_err());
    }

    #[tokio::test]
    async fn update_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("test.db")).await.unwrap();

        let created = create_account(&pool, &loan_account()).await.unwrap();
        let id = created.id.unwrap();

        let mut revised = created.clone();
        revised.name = "Gold loan (renewed)".to_string();
        revised.tenure_months = Some(36);
        let updated = update_account(&pool, id, &revised).await.unwrap().unwrap();
        assert_eq!(updated.name, "Gold loan (renewed)");

        assert!(delete_account(&pool, id).await.unwrap());
        assert!(get_account(&pool, id).await.unwrap().is_none());
        assert!(update_account(&pool, id, &revised).await.unwrap().is_none());
    }
}
