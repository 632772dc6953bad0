pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod retention;

pub use adapters::{BackupSummary, PostgresStore};
pub use config::AppConfig;
pub use domain::{BetRecord, NewBet, Sport};
pub use error::{Result, SportFailure, SweepError};
pub use retention::{BetStore, RetentionPolicy, SportOutcome, SweepReport, Sweeper};
