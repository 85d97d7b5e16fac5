use sqlx::PgPool;
use uuid::Uuid;
use tracing::error;
use crate::models::{Holding, Portfolio};

/// Appends a holding, creating the owner's portfolio row on first use.
///
/// Returns `false` when the owner already holds the ticker; the
/// `(owner, ticker)` unique constraint makes the check atomic.
pub async fn insert_if_absent(
    pool: &PgPool,
    owner: &str,
    holding: &Holding,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO portfolios (owner) VALUES ($1)
         ON CONFLICT (owner) DO NOTHING"
    )
        .bind(owner)
        .execute(&mut *tx)
        .await?;

    let inserted = sqlx::query(
        "INSERT INTO holdings (id, owner, ticker, quantity, average_price, investment_date, currency)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (owner, ticker) DO NOTHING"
    )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&holding.ticker)
        .bind(&holding.quantity)
        .bind(&holding.average_price)
        .bind(holding.investment_date)
        .bind(&holding.currency)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert holding {} for {}: {}", holding.ticker, owner, e);
            e
        })?
        .rows_affected() == 1;

    if inserted {
        tx.commit().await?;
    } else {
        tx.rollback().await?;
    }
    Ok(inserted)
}

pub async fn fetch_portfolio(
    pool: &PgPool,
    owner: &str,
) -> Result<Option<Portfolio>, sqlx::Error> {
    let created_at: Option<chrono::DateTime<chrono::Utc>> = sqlx::query_scalar(
        "SELECT created_at FROM portfolios WHERE owner = $1"
    )
        .bind(owner)
        .fetch_optional(pool)
        .await?;

    let Some(created_at) = created_at else {
        return Ok(None);
    };

    let holdings = sqlx::query_as::<_, Holding>(
        "SELECT ticker, quantity, average_price, investment_date, currency
         FROM holdings
         WHERE owner = $1
         ORDER BY seq ASC"
    )
        .bind(owner)
        .fetch_all(pool)
        .await?;

    Ok(Some(Portfolio {
        owner: owner.to_string(),
        holdings,
        created_at,
    }))
}
