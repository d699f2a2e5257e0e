use chrono::NaiveDate;
use khata_core::{FuturePrediction, Money};

use crate::db::{decode_err, DbPool};

type FutureRow = (
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

const FUTURE_COLUMNS: &str = "id, date, description, amount_cents, payment_mode, account_id, \
     department, category, comments, paid";

fn map_row(row: FutureRow) -> Result<FuturePrediction, sqlx::Error> {
    Ok(FuturePrediction {
        id: Some(row.0),
        date: row.1,
        description: row.2,
        amount: Money::from_cents(row.3),
        payment_mode: row.4.parse().map_err(decode_err)?,
        account_id: row.5,
        department: row.6.parse().map_err(decode_err)?,
        category: row.7.parse().map_err(decode_err)?,
        comments: row.8,
        paid: row.9 != 0,
    })
}

pub async fn create_prediction(
    pool: &DbPool,
    prediction: &FuturePrediction,
) -> Result<FuturePrediction, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO future_predictions (date, description, amount_cents, payment_mode, \
         account_id, department, category, comments, paid) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(prediction.date)
    .bind(&prediction.description)
    .bind(prediction.amount.to_cents())
    .bind(prediction.payment_mode.as_str())
    .bind(&prediction.account_id)
    .bind(prediction.department.as_str())
    .bind(prediction.category.as_str())
    .bind(&prediction.comments)
    .bind(prediction.paid as i64)
    .fetch_one(pool)
    .await?;

    Ok(FuturePrediction {
        id: Some(row.0),
        ..prediction.clone()
    })
}

pub async fn get_prediction(
    pool: &DbPool,
    id: i64,
) -> Result<Option<FuturePrediction>, sqlx::Error> {
    let row = sqlx::query_as::<_, FutureRow>(&format!(
        "SELECT {FUTURE_COLUMNS} FROM future_predictions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(map_row).transpose()
}

pub async fn list_predictions(
    pool: &DbPool,
    paid: Option<bool>,
    skip: i64,
    limit: i64,
) -> Result<Vec<FuturePrediction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FutureRow>(&format!(
        "SELECT {FUTURE_COLUMNS} FROM future_predictions \
         WHERE (?1 IS NULL OR paid = ?1) ORDER BY date, id LIMIT ?2 OFFSET ?3"
    ))
    .bind(paid.map(|p| p as i64))
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(map_row).collect()
}

pub async fn update_prediction(
    pool: &DbPool,
    id: i64,
    prediction: &FuturePrediction,
) -> Result<Option<FuturePrediction>, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE future_predictions SET date = ?, description = ?, amount_cents = ?, \
         payment_mode = ?, account_id = ?, department = ?, category = ?, comments = ?, \
         paid = ? WHERE id = ?",
    )
    .bind(prediction.date)
    .bind(&prediction.description)
    .bind(prediction.amount.to_cents())
    .bind(prediction.payment_mode.as_str())
    .bind(&prediction.account_id)
    .bind(prediction.department.as_str())
    .bind(prediction.category.as_str())
    .bind(&prediction.comments)
    .bind(prediction.paid as i64)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(FuturePrediction {
        id: Some(id),
        ..prediction.clone()
    }))
}

pub async fn delete_prediction(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM future_predictions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn mark_paid(pool: &DbPool, id: i64) -> Result<Option<FuturePrediction>, sqlx::Error> {
    sqlx::query("UPDATE future_predictions SET paid = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    get_prediction(pool, id).await
}

/// Unpaid predictions dated `from` or later, soonest first. Feeds the
/// upcoming-payments digest.
pub async fn unpaid_from(
    pool: &DbPool,
    from: NaiveDate,
    limit: i64,
) -> Result<Vec<FuturePrediction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FutureRow>(&format!(
        "SELECT {FUTURE_COLUMNS} FROM future_predictions \
         WHERE paid = 0 AND date >= ? ORDER BY date, id LIMIT ?"
    ))
    .bind(from)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(map_row).collect()
}
