//! Per-sport bet retention
//!
//! One sweep removes every bet row older than its sport's retention window.
//! Sports are processed in the policy's declared order; a failure on one
//! sport is recorded and the remaining sports are still attempted. The
//! aggregate failure, if any, is raised only after the full pass.

use crate::domain::Sport;
use crate::error::{Result, SportFailure, SweepError};
use async_trait::async_trait;
use chrono::Duration;
use tracing::{debug, error, info, warn};

/// Static mapping from sport to maximum bet age.
///
/// Iteration order is the declared entry order; a sweep visits sports in
/// exactly this order. Each sport has at most one entry.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    entries: Vec<(Sport, Duration)>,
}

impl RetentionPolicy {
    /// The production retention rules.
    pub fn standard() -> Self {
        Self::new(vec![
            (Sport::Nba, Duration::days(7)),
            (Sport::Nfl, Duration::days(1)),
            (Sport::Mlb, Duration::days(1)),
            (Sport::Wnba, Duration::days(1)),
        ])
    }

    /// Build a policy from explicit entries. A later entry for a sport
    /// replaces the earlier one, keeping its original position.
    pub fn new(entries: Vec<(Sport, Duration)>) -> Self {
        let mut deduped: Vec<(Sport, Duration)> = Vec::with_capacity(entries.len());
        for (sport, window) in entries {
            match deduped.iter_mut().find(|(s, _)| *s == sport) {
                Some(entry) => entry.1 = window,
                None => deduped.push((sport, window)),
            }
        }
        Self { entries: deduped }
    }

    /// Retention window for a sport; `None` when the sweeper does not
    /// manage the sport.
    pub fn window(&self, sport: Sport) -> Option<Duration> {
        self.entries
            .iter()
            .find(|(s, _)| *s == sport)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Sport, Duration)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Store operations the sweeper depends on
#[async_trait]
pub trait BetStore: Send + Sync {
    /// Delete every bet of `sport` created more than `window` ago.
    /// Returns the number of rows removed.
    async fn delete_expired(&self, sport: Sport, window: Duration) -> Result<u64>;
}

/// Result of one sport's delete within a sweep
#[derive(Debug, Clone)]
pub struct SportOutcome {
    pub sport: Sport,
    /// Rows deleted on success, error message on failure
    pub result: std::result::Result<u64, String>,
}

/// Aggregated outcome of one full sweep, in policy order
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub outcomes: Vec<SportOutcome>,
}

impl SweepReport {
    /// Total rows deleted by the sports that succeeded
    pub fn deleted_total(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }

    pub fn failures(&self) -> Vec<SportFailure> {
        self.outcomes
            .iter()
            .filter_map(|o| {
                o.result.as_ref().err().map(|message| SportFailure {
                    sport: o.sport,
                    message: message.clone(),
                })
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Log the aggregate line; per-sport outcomes were already logged
    /// as the sweep progressed.
    pub fn log_summary(&self) {
        if self.is_success() {
            info!(
                "Retention sweep complete: {} bets deleted across {} sports",
                self.deleted_total(),
                self.outcomes.len()
            );
        } else {
            warn!(
                "Retention sweep finished with {}/{} sports failed",
                self.failures().len(),
                self.outcomes.len()
            );
        }
    }

    /// Convert to a process-level result: the aggregate failure carries
    /// every failed sport and its message.
    pub fn into_result(self) -> Result<SweepReport> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(self)
        } else {
            Err(SweepError::SweepFailed { failures })
        }
    }
}

/// Executes one full retention sweep across the configured sports
pub struct Sweeper<S: BetStore> {
    store: S,
    policy: RetentionPolicy,
}

impl<S: BetStore> Sweeper<S> {
    pub fn new(store: S, policy: RetentionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one sweep. Every sport in the policy is attempted even when an
    /// earlier sport fails; outcomes are collected in policy order.
    pub async fn run(&self) -> SweepReport {
        info!("Retention sweep started ({} sports)", self.policy.len());

        let mut outcomes = Vec::with_capacity(self.policy.len());
        for (sport, window) in self.policy.iter() {
            match self.store.delete_expired(sport, window).await {
                Ok(deleted) => {
                    if deleted > 0 {
                        info!("{}: deleted {} expired bets", sport, deleted);
                    } else {
                        debug!("{}: no expired bets", sport);
                    }
                    outcomes.push(SportOutcome {
                        sport,
                        result: Ok(deleted),
                    });
                }
                Err(e) => {
                    error!("{}: retention delete failed: {}", sport, e);
                    outcomes.push(SportOutcome {
                        sport,
                        result: Err(e.to_string()),
                    });
                }
            }
        }

        SweepReport { outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;
    use chrono::{DateTime, Utc};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory store mirroring the delete predicate of the real one
    struct MemoryStore {
        now: DateTime<Utc>,
        bets: Mutex<HashMap<Sport, Vec<DateTime<Utc>>>>,
        fail: HashSet<Sport>,
        calls: Mutex<Vec<Sport>>,
    }

    impl MemoryStore {
        fn new(now: DateTime<Utc>) -> Self {
            Self {
                now,
                bets: Mutex::new(HashMap::new()),
                fail: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn insert_aged(&self, sport: Sport, age: Duration) {
            self.bets
                .lock()
                .unwrap()
                .entry(sport)
                .or_default()
                .push(self.now - age);
        }

        fn failing_on(mut self, sport: Sport) -> Self {
            self.fail.insert(sport);
            self
        }

        fn remaining(&self, sport: Sport) -> usize {
            self.bets
                .lock()
                .unwrap()
                .get(&sport)
                .map(|rows| rows.len())
                .unwrap_or(0)
        }

        fn calls(&self) -> Vec<Sport> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BetStore for MemoryStore {
        async fn delete_expired(&self, sport: Sport, window: Duration) -> Result<u64> {
            self.calls.lock().unwrap().push(sport);

            if self.fail.contains(&sport) {
                return Err(SweepError::Internal("simulated store error".to_string()));
            }

            let cutoff = self.now - window;
            let mut bets = self.bets.lock().unwrap();
            let rows = bets.entry(sport).or_default();
            let before = rows.len();
            rows.retain(|created_at| *created_at >= cutoff);
            Ok((before - rows.len()) as u64)
        }
    }

    #[test]
    fn test_standard_policy_windows() {
        let policy = RetentionPolicy::standard();

        assert_eq!(policy.window(Sport::Nba), Some(Duration::days(7)));
        assert_eq!(policy.window(Sport::Nfl), Some(Duration::days(1)));
        assert_eq!(policy.window(Sport::Mlb), Some(Duration::days(1)));
        assert_eq!(policy.window(Sport::Wnba), Some(Duration::days(1)));
        assert_eq!(policy.len(), 4);
    }

    #[test]
    fn test_standard_policy_order_is_declared_order() {
        let sports: Vec<Sport> = RetentionPolicy::standard().iter().map(|(s, _)| s).collect();
        assert_eq!(sports, vec![Sport::Nba, Sport::Nfl, Sport::Mlb, Sport::Wnba]);
    }

    #[test]
    fn test_duplicate_entries_collapse_to_one_window() {
        let policy = RetentionPolicy::new(vec![
            (Sport::Nba, Duration::days(7)),
            (Sport::Nba, Duration::days(3)),
        ]);

        assert_eq!(policy.len(), 1);
        assert_eq!(policy.window(Sport::Nba), Some(Duration::days(3)));
    }

    #[tokio::test]
    async fn test_expired_rows_deleted_and_fresh_rows_survive() {
        let store = MemoryStore::new(Utc::now());
        store.insert_aged(Sport::Nba, Duration::days(8));
        store.insert_aged(Sport::Nba, Duration::days(1));

        let sweeper = Sweeper::new(store, RetentionPolicy::standard());
        let report = sweeper.run().await;

        assert!(report.is_success());
        assert_eq!(report.deleted_total(), 1);
        assert_eq!(sweeper.store().remaining(Sport::Nba), 1);
    }

    #[tokio::test]
    async fn test_football_window_is_one_day() {
        let store = MemoryStore::new(Utc::now());
        store.insert_aged(Sport::Nfl, Duration::hours(25));
        store.insert_aged(Sport::Nfl, Duration::hours(1));

        let sweeper = Sweeper::new(store, RetentionPolicy::standard());
        let report = sweeper.run().await;

        assert_eq!(report.deleted_total(), 1);
        assert_eq!(sweeper.store().remaining(Sport::Nfl), 1);
    }

    #[tokio::test]
    async fn test_second_sweep_deletes_nothing() {
        let store = MemoryStore::new(Utc::now());
        store.insert_aged(Sport::Nba, Duration::days(8));
        store.insert_aged(Sport::Mlb, Duration::days(2));

        let sweeper = Sweeper::new(store, RetentionPolicy::standard());
        let first = sweeper.run().await;
        let second = sweeper.run().await;

        assert_eq!(first.deleted_total(), 2);
        assert_eq!(second.deleted_total(), 0);
        assert!(second.is_success());
    }

    #[tokio::test]
    async fn test_one_sport_failing_does_not_block_the_rest() {
        let store = MemoryStore::new(Utc::now()).failing_on(Sport::Nfl);
        store.insert_aged(Sport::Nba, Duration::days(8));
        store.insert_aged(Sport::Wnba, Duration::days(2));

        let sweeper = Sweeper::new(store, RetentionPolicy::standard());
        let report = sweeper.run().await;

        // Every sport was attempted, in policy order
        assert_eq!(
            sweeper.store().calls(),
            vec![Sport::Nba, Sport::Nfl, Sport::Mlb, Sport::Wnba]
        );
        // The healthy sports still swept
        assert_eq!(report.deleted_total(), 2);
        assert_eq!(sweeper.store().remaining(Sport::Nba), 0);
        assert_eq!(sweeper.store().remaining(Sport::Wnba), 0);

        // The aggregate carries exactly the failed sport
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].sport, Sport::Nfl);
        assert!(failures[0].message.contains("simulated store error"));

        match report.into_result() {
            Err(SweepError::SweepFailed { failures }) => assert_eq!(failures.len(), 1),
            other => panic!("expected SweepFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_sport_outside_policy_is_never_touched() {
        let store = MemoryStore::new(Utc::now());
        store.insert_aged(Sport::Wnba, Duration::days(30));

        let policy = RetentionPolicy::new(vec![(Sport::Nba, Duration::days(7))]);
        let sweeper = Sweeper::new(store, policy);
        for _ in 0..3 {
            let report = sweeper.run().await;
            assert!(report.is_success());
        }

        assert_eq!(sweeper.store().remaining(Sport::Wnba), 1);
        assert!(!sweeper.store().calls().contains(&Sport::Wnba));
    }

    #[tokio::test]
    async fn test_zero_expired_rows_is_a_normal_success() {
        let store = MemoryStore::new(Utc::now());

        let report = Sweeper::new(store, RetentionPolicy::standard()).run().await;

        assert!(report.is_success());
        assert_eq!(report.deleted_total(), 0);
        assert_eq!(report.outcomes.len(), 4);
        assert_ok!(report.into_result());
    }
}
