//! focusdeck-stats - print study statistics as JSON
//!
//! Reads the same database as the TUI and writes the aggregated summary to
//! stdout for scripting.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/focusdeck/data.db (~/.local/share/focusdeck/data.db)
//! - Logs: $XDG_STATE_HOME/focusdeck/focusdeck.log (~/.local/state/focusdeck/focusdeck.log)
//! - Config: $XDG_CONFIG_HOME/focusdeck/config.toml (~/.config/focusdeck/config.toml)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use focusdeck_core::stats::compute_stats;
use focusdeck_core::{Config, Database, TimeRange};

#[derive(Parser)]
#[command(name = "focusdeck-stats")]
#[command(about = "Print study statistics as JSON")]
#[command(version)]
struct Args {
    /// Time range to aggregate over: week, month, or year
    #[arg(short, long, default_value = "week")]
    range: TimeRange,

    /// User to report on (defaults to the configured user)
    #[arg(short, long)]
    user: Option<String>,

    /// Database path override
    #[arg(long)]
    db: Option<PathBuf>,

    /// Compact output instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        focusdeck_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = args.db.unwrap_or_else(Config::database_path);
    tracing::info!(path = %db_path.display(), "Opening database");

    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let user_id = args.user.unwrap_or_else(|| config.user.id.clone());
    let summary = compute_stats(&db, &user_id, args.range).context("failed to compute stats")?;

    let output = if args.compact {
        serde_json::to_string(&summary)?
    } else {
        serde_json::to_string_pretty(&summary)?
    };
    println!("{}", output);

    Ok(())
}
