use crate::domain::Sport;
use thiserror::Error;

/// One sport's failure inside an otherwise-completed sweep.
#[derive(Debug, Clone)]
pub struct SportFailure {
    pub sport: Sport,
    pub message: String,
}

/// Main error type for the sweeper
#[derive(Error, Debug)]
pub enum SweepError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Store errors
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // Raised once per sweep, after every sport was attempted
    #[error("Retention sweep failed: {}", list_failures(.failures))]
    SweepFailed { failures: Vec<SportFailure> },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for SweepError
pub type Result<T> = std::result::Result<T, SweepError>;

fn list_failures(failures: &[SportFailure]) -> String {
    let detail = failures
        .iter()
        .map(|f| format!("{}: {}", f.sport, f.message))
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} sport(s) [{}]", failures.len(), detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_failed_display_names_each_sport() {
        let err = SweepError::SweepFailed {
            failures: vec![
                SportFailure {
                    sport: Sport::Nfl,
                    message: "connection reset".to_string(),
                },
                SportFailure {
                    sport: Sport::Mlb,
                    message: "statement timeout".to_string(),
                },
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("2 sport(s)"));
        assert!(msg.contains("NFL: connection reset"));
        assert!(msg.contains("MLB: statement timeout"));
    }
}
