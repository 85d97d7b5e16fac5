use sqlx::PgPool;
use crate::models::MarketQuote;

pub async fn upsert(pool: &PgPool, quote: &MarketQuote) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO market_data (ticker, date, open, high, low, close, volume)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (ticker, date)
        DO UPDATE SET open = EXCLUDED.open,
                      high = EXCLUDED.high,
                      low = EXCLUDED.low,
                      close = EXCLUDED.close,
                      volume = EXCLUDED.volume,
                      updated_at = now()
        "#
    )
        .bind(&quote.ticker)
        .bind(quote.date)
        .bind(&quote.open)
        .bind(&quote.high)
        .bind(&quote.low)
        .bind(&quote.close)
        .bind(quote.volume)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<MarketQuote>, sqlx::Error> {
    sqlx::query_as::<_, MarketQuote>(
        "SELECT ticker, date, open, high, low, close, volume
         FROM market_data
         ORDER BY ticker, date DESC"
    )
        .fetch_all(pool)
        .await
}
