use crate::config::DatabaseConfig;
use crate::domain::{BetRecord, NewBet, Sport};
use crate::error::{Result, SweepError};
use crate::retention::BetStore;
use async_trait::async_trait;
use chrono::Duration;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::{debug, info};

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect a new pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(SweepError::Connection)?;

        info!("Connected to PostgreSQL at {}/{}", config.host, config.name);
        Ok(Self { pool })
    }

    /// Create a store from an existing connection pool (zero-cost reuse)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ==================== Bets ====================

    /// Insert a bet; the store assigns id and created_at
    pub async fn insert_bet(&self, sport: Sport, bet: &NewBet) -> Result<i64> {
        let sql = format!(
            r#"
            INSERT INTO {} (analysis, price, game_time, game_tag)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
            sport.table()
        );

        let row = sqlx::query(&sql)
            .bind(&bet.analysis)
            .bind(bet.price)
            .bind(bet.game_time)
            .bind(&bet.game_tag)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("id"))
    }

    /// Get all bets for a sport, newest first
    pub async fn get_bets(&self, sport: Sport) -> Result<Vec<BetRecord>> {
        let sql = format!(
            r#"
            SELECT id, analysis, price, game_time, game_tag, created_at
            FROM {}
            ORDER BY created_at DESC
            "#,
            sport.table()
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let bets = rows
            .iter()
            .map(|row| BetRecord {
                id: Some(row.get("id")),
                analysis: row.get("analysis"),
                price: row.get("price"),
                game_time: row.get("game_time"),
                game_tag: row.get("game_tag"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(bets)
    }

    /// Count bets for a sport
    pub async fn count_bets(&self, sport: Sport) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) as count FROM {}", sport.table());
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.get("count"))
    }

    /// Count bets of `sport` already past `window` without deleting them
    pub async fn count_expired_bets(&self, sport: Sport, window: Duration) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) as count FROM {} WHERE created_at < NOW() - ($1 * INTERVAL '1 second')",
            sport.table()
        );
        let row = sqlx::query(&sql)
            .bind(window.num_seconds() as f64)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    // ==================== Retention ====================

    /// Delete every bet of `sport` older than `window`.
    /// One statement per sport; each delete is its own transaction.
    pub async fn delete_expired_bets(&self, sport: Sport, window: Duration) -> Result<u64> {
        let result = sqlx::query(&delete_expired_sql(sport))
            .bind(window.num_seconds() as f64)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected();
        debug!("{}: {} rows past retention removed", sport, deleted);
        Ok(deleted)
    }

    // ==================== NFL backup maintenance ====================

    /// Delete duplicate backup rows, keeping the newest created_at per id
    /// (ctid tiebreak)
    pub async fn dedupe_backup(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            WITH ranked AS (
                SELECT ctid, id,
                       ROW_NUMBER() OVER (
                           PARTITION BY id
                           ORDER BY created_at DESC, ctid DESC
                       ) AS rn
                FROM v2_nfl_daily_bets_backup
            )
            DELETE FROM v2_nfl_daily_bets_backup b
            USING ranked r
            WHERE b.ctid = r.ctid
              AND r.rn > 1
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Ensure the unique index on the backup id column exists
    pub async fn ensure_backup_unique_index(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS ux_v2_nfl_daily_bets_backup_id
            ON v2_nfl_daily_bets_backup (id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Copy rows newer than `days` into the backup, skipping existing ids.
    /// Returns the number of rows inserted.
    pub async fn sync_recent_to_backup(&self, days: i32) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO v2_nfl_daily_bets_backup (id, analysis, created_at, price, game_time, game_tag)
            SELECT b.id, b.analysis, b.created_at, b.price, b.game_time, b.game_tag
            FROM v2_nfl_daily_bets b
            WHERE b.created_at > NOW() - INTERVAL '1 day' * $1
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Run dedupe, index check, and recent-row sync, in that order
    pub async fn run_backup_maintenance(&self, days: i32) -> Result<BackupSummary> {
        let deduped = self.dedupe_backup().await?;
        self.ensure_backup_unique_index().await?;
        let synced = self.sync_recent_to_backup(days).await?;

        info!(
            "Backup maintenance: {} duplicates removed, {} rows synced",
            deduped, synced
        );

        Ok(BackupSummary { deduped, synced })
    }
}

#[async_trait]
impl BetStore for PostgresStore {
    async fn delete_expired(&self, sport: Sport, window: Duration) -> Result<u64> {
        self.delete_expired_bets(sport, window).await
    }
}

/// Backup maintenance counters
#[derive(Debug, Clone)]
pub struct BackupSummary {
    pub deduped: u64,
    pub synced: u64,
}

fn delete_expired_sql(sport: Sport) -> String {
    format!(
        "DELETE FROM {} WHERE created_at < NOW() - ($1 * INTERVAL '1 second')",
        sport.table()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_statement_targets_the_sport_table() {
        for sport in Sport::ALL {
            let sql = delete_expired_sql(sport);
            assert!(sql.contains(sport.table()));
            assert!(sql.contains("created_at < NOW()"));
        }
    }

    #[test]
    fn test_delete_statements_are_distinct_per_sport() {
        let mut statements: Vec<String> = Sport::ALL.iter().map(|s| delete_expired_sql(*s)).collect();
        statements.sort();
        statements.dedup();
        assert_eq!(statements.len(), Sport::ALL.len());
    }
}
