use clap::{Parser, Subcommand};

use crate::retention::RetentionPolicy;

#[derive(Parser)]
#[command(name = "betsweep")]
#[command(version = "0.1.0")]
#[command(about = "Retention sweeper for daily sports-bet tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory path
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one retention sweep across all configured sports (default)
    Sweep,
    /// Show per-sport row counts and how many are past retention
    Status,
    /// Print the retention policy table
    Policy,
    /// Apply database migrations
    Migrate,
    /// Run NFL backup maintenance (dedupe + sync recent rows)
    Backup {
        /// Days of recent rows to sync into the backup table
        #[arg(long)]
        days: Option<i32>,
    },
}

/// Print the retention policy in sweep order
pub fn print_policy(policy: &RetentionPolicy) {
    println!("{:<6} {:<24} RETENTION", "SPORT", "TABLE");
    for (sport, window) in policy.iter() {
        println!(
            "{:<6} {:<24} {} day(s)",
            sport.as_str(),
            sport.table(),
            window.num_days()
        );
    }
}
