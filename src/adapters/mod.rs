pub mod postgres;

pub use postgres::{BackupSummary, PostgresStore};
