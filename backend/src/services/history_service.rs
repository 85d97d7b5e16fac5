use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::errors::AppError;
use crate::models::{PortfolioSnapshot, PortfolioValuation, SnapshotAsset, SnapshotWithChange};
use crate::store::Store;
use crate::utils::ratio_percent;

/// Day-over-day change for a newest-first series.
///
/// Entry `i` (for `i >= 1`) is compared against its chronologically later
/// neighbour `i - 1`: `round((v[i-1] - v[i]) / v[i] * 100, 2)`.
/// The newest entry has nothing to compare with, and a zero-valued entry
/// cannot be used as a base; both yield `None`.
pub fn day_over_day_changes(newest_first: &[PortfolioSnapshot]) -> Vec<Option<BigDecimal>> {
    let mut changes = Vec::with_capacity(newest_first.len());
    for (i, snapshot) in newest_first.iter().enumerate() {
        if i == 0 {
            changes.push(None);
            continue;
        }
        let later = &newest_first[i - 1].portfolio_value;
        let delta = later - &snapshot.portfolio_value;
        match ratio_percent(&delta, &snapshot.portfolio_value) {
            Ok(pct) => changes.push(Some(pct)),
            Err(e) => {
                debug!("No change for {} on {}: {}", snapshot.owner, snapshot.date, e);
                changes.push(None);
            }
        }
    }
    changes
}

#[derive(Clone)]
pub struct HistorySnapshotter {
    store: Arc<dyn Store>,
}

impl HistorySnapshotter {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Writes the snapshot unless `(owner, date)` already has one.
    ///
    /// Returns whether a row was written. An existing snapshot is never overwritten.
    pub async fn record_if_absent(
        &self,
        owner: &str,
        date: NaiveDate,
        portfolio_value: BigDecimal,
        assets: Vec<SnapshotAsset>,
    ) -> Result<bool, AppError> {
        let snapshot = PortfolioSnapshot::new(owner, date, portfolio_value, assets);
        let inserted = self.store.insert_snapshot_if_absent(&snapshot).await
            .map_err(|e| {
                error!("Failed to record snapshot for {} on {}: {}", owner, date, e);
                AppError::Db(e)
            })?;

        if inserted {
            info!("✓ Recorded portfolio snapshot for {} on {}", owner, date);
        } else {
            debug!("Snapshot for {} on {} already exists", owner, date);
        }
        Ok(inserted)
    }

    pub async fn record_valuation(
        &self,
        owner: &str,
        date: NaiveDate,
        valuation: &PortfolioValuation,
    ) -> Result<bool, AppError> {
        let assets = valuation.positions.iter().map(SnapshotAsset::from).collect();
        self.record_if_absent(owner, date, valuation.total_value.clone(), assets).await
    }

    /// Snapshots in `[from, to]`, newest first.
    pub async fn get_range(
        &self,
        owner: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PortfolioSnapshot>, AppError> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(AppError::Validation(format!("from ({}) is after to ({})", f, t)));
            }
        }
        Ok(self.store.fetch_snapshots(owner, from, to).await?)
    }

    pub async fn get_range_with_changes(
        &self,
        owner: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<SnapshotWithChange>, AppError> {
        let snapshots = self.get_range(owner, from, to).await?;
        let changes = day_over_day_changes(&snapshots);

        Ok(snapshots
            .into_iter()
            .zip(changes)
            .map(|(snapshot, pct_change)| SnapshotWithChange { snapshot, pct_change })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use bigdecimal::Zero;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn snapshotter() -> HistorySnapshotter {
        HistorySnapshotter::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_second_record_same_day_is_noop() {
        let history = snapshotter();

        assert!(history.record_if_absent("u", day(29), dec("1000"), vec![]).await.unwrap());
        assert!(!history.record_if_absent("u", day(29), dec("2500"), vec![]).await.unwrap());

        let stored = history.get_range("u", None, None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].portfolio_value, dec("1000"));
    }

    #[tokio::test]
    async fn test_change_is_attached_to_the_older_entry() {
        let history = snapshotter();
        history.record_if_absent("u", day(1), dec("1000"), vec![]).await.unwrap();
        history.record_if_absent("u", day(2), dec("1100"), vec![]).await.unwrap();

        let window = history.get_range_with_changes("u", None, None).await.unwrap();

        assert_eq!(window[0].snapshot.date, day(2));
        assert_eq!(window[0].pct_change, None);
        assert_eq!(window[1].snapshot.date, day(1));
        assert_eq!(window[1].pct_change, Some(dec("10.0")));
    }

    #[test]
    fn test_changes_over_longer_window() {
        let series = vec![
            PortfolioSnapshot::new("u", day(3), dec("990"), vec![]),
            PortfolioSnapshot::new("u", day(2), dec("1100"), vec![]),
            PortfolioSnapshot::new("u", day(1), dec("1000"), vec![]),
        ];

        let changes = day_over_day_changes(&series);
        assert_eq!(changes, vec![None, Some(dec("-10")), Some(dec("10"))]);
    }

    #[test]
    fn test_zero_valued_base_has_no_change() {
        let series = vec![
            PortfolioSnapshot::new("u", day(2), dec("500"), vec![]),
            PortfolioSnapshot::new("u", day(1), BigDecimal::zero(), vec![]),
        ];
        assert_eq!(day_over_day_changes(&series), vec![None, None]);
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected() {
        let history = snapshotter();
        let result = history.get_range("u", Some(day(5)), Some(day(1))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
