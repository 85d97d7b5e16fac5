use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use crate::models::{PortfolioSnapshot, SnapshotAsset};

#[derive(Debug, FromRow)]
struct SnapshotRow {
    owner: String,
    snapshot_date: NaiveDate,
    portfolio_value: BigDecimal,
    assets: Json<Vec<SnapshotAsset>>,
    created_at: DateTime<Utc>,
}

impl From<SnapshotRow> for PortfolioSnapshot {
    fn from(row: SnapshotRow) -> Self {
        PortfolioSnapshot {
            owner: row.owner,
            date: row.snapshot_date,
            portfolio_value: row.portfolio_value,
            assets: row.assets.0,
            created_at: row.created_at,
        }
    }
}

/// Returns `true` if the row was written, `false` if the owner already has
/// a snapshot for that date. The existing row is left untouched.
pub async fn insert_if_absent(
    pool: &PgPool,
    snapshot: &PortfolioSnapshot,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO portfolio_history (id, owner, snapshot_date, portfolio_value, assets, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (owner, snapshot_date) DO NOTHING"
    )
        .bind(Uuid::new_v4())
        .bind(&snapshot.owner)
        .bind(snapshot.date)
        .bind(&snapshot.portfolio_value)
        .bind(Json(&snapshot.assets))
        .bind(snapshot.created_at)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Snapshots for `owner` within the optional inclusive bounds, newest first.
pub async fn fetch_range(
    pool: &PgPool,
    owner: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<PortfolioSnapshot>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SnapshotRow>(
        "SELECT owner, snapshot_date, portfolio_value, assets, created_at
         FROM portfolio_history
         WHERE owner = $1
           AND ($2::date IS NULL OR snapshot_date >= $2)
           AND ($3::date IS NULL OR snapshot_date <= $3)
         ORDER BY snapshot_date DESC"
    )
        .bind(owner)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(PortfolioSnapshot::from).collect())
}
