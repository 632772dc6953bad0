use betsweep::adapters::PostgresStore;
use betsweep::cli::{self, Cli, Commands};
use betsweep::config::{AppConfig, LoggingConfig};
use betsweep::error::{Result, SweepError};
use betsweep::retention::{RetentionPolicy, Sweeper};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Policy) => {
            cli::print_policy(&RetentionPolicy::standard());
            Ok(())
        }
        Some(Commands::Migrate) => {
            let config = load_config(&cli)?;
            let _guard = init_logging(&config.logging);
            let store = PostgresStore::connect(&config.database).await?;
            let result = store.migrate().await;
            store.close().await;
            result
        }
        Some(Commands::Backup { days }) => {
            let config = load_config(&cli)?;
            let _guard = init_logging(&config.logging);
            let days = (*days).unwrap_or(config.backup.days);
            let store = PostgresStore::connect(&config.database).await?;
            let result = store.run_backup_maintenance(days).await;
            store.close().await;
            result.map(|_| ())
        }
        Some(Commands::Status) => {
            let config = load_config(&cli)?;
            let _guard = init_logging(&config.logging);
            run_status(&config).await
        }
        Some(Commands::Sweep) | None => {
            let config = load_config(&cli)?;
            let _guard = init_logging(&config.logging);
            run_sweep(&config).await
        }
    }
}

/// Report per-sport totals and expired counts without deleting anything
async fn run_status(config: &AppConfig) -> Result<()> {
    let store = PostgresStore::connect(&config.database).await?;
    let policy = RetentionPolicy::standard();

    println!("{:<6} {:>8} {:>8}", "SPORT", "ROWS", "EXPIRED");
    let mut result = Ok(());
    for (sport, window) in policy.iter() {
        match tokio::try_join!(
            store.count_bets(sport),
            store.count_expired_bets(sport, window)
        ) {
            Ok((total, expired)) => println!("{:<6} {:>8} {:>8}", sport.as_str(), total, expired),
            Err(e) => {
                eprintln!("{}: {}", sport.as_str(), e);
                result = Err(e);
            }
        }
    }

    store.close().await;
    result
}

/// One full sweep: connect, delete per sport, close, surface the aggregate.
/// A connection failure aborts before any sport is attempted.
async fn run_sweep(config: &AppConfig) -> Result<()> {
    let store = PostgresStore::connect(&config.database).await?;

    let sweeper = Sweeper::new(store.clone(), RetentionPolicy::standard());
    let report = sweeper.run().await;
    report.log_summary();

    store.close().await;
    report.into_result().map(|_| ())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = AppConfig::load_from(&cli.config)?;
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("config: {}", e);
        }
        return Err(SweepError::InvalidConfig(errors.join("; ")));
    }
    Ok(config)
}

fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.level)));

    match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "betsweep.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            if config.json {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .json()
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .init();
            }
            Some(guard)
        }
        None => {
            if config.json {
                tracing_subscriber::fmt().with_env_filter(filter).json().init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .init();
            }
            None
        }
    }
}
