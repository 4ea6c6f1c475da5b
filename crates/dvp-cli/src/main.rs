//! `dvp` — build the divorce-petition database from a cleaned CSV export.
//!
//! # Usage
//!
//! ```text
//! dvp --csv nc_al_tn_clean_data.csv --db dv_petitions.db
//! dvp --db dv_petitions.db --migrate-people
//! ```
//!
//! Paths may also come from `dvp.toml` (`csv_path`, `db_path`) or the
//! `DVP_CSV_PATH` / `DVP_DB_PATH` environment variables. Flags win over both.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dvp", version, about = "Normalize divorce-petition records into SQLite")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "dvp.toml")]
  config: PathBuf,

  /// Cleaned CSV export to load.
  #[arg(long, value_name = "FILE")]
  csv: Option<PathBuf>,

  /// Database to create, or to migrate with --migrate-people.
  #[arg(long, value_name = "FILE")]
  db: Option<PathBuf>,

  /// Split multi-name People rows in an existing database (takes a backup).
  #[arg(long)]
  migrate_people: bool,

  /// Print the run report as JSON on stdout.
  #[arg(long)]
  json: bool,
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// File and environment configuration.
#[derive(Deserialize, Debug, Clone, PartialEq)]
struct Settings {
  csv_path: Option<PathBuf>,
  db_path:  PathBuf,
}

const DEFAULT_DB_PATH: &str = "dv_petitions.db";

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
  config::Config::builder()
    .set_default("db_path", DEFAULT_DB_PATH)?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("DVP"))
    .build()
    .with_context(|| format!("failed to read config file {}", path.display()))?
    .try_deserialize()
    .context("failed to deserialise settings")
}

impl Settings {
  /// Apply command-line overrides and expand `~/` in both paths.
  fn merge(self, cli: &Cli) -> Settings {
    Settings {
      csv_path: cli.csv.clone().or(self.csv_path).map(|p| expand_tilde(&p)),
      db_path:  expand_tilde(cli.db.as_deref().unwrap_or(&self.db_path)),
    }
  }

  /// The CSV to load. Required unless migrating.
  fn csv_input(&self, config: &Path) -> anyhow::Result<&Path> {
    match &self.csv_path {
      Some(path) => Ok(path.as_path()),
      None => bail!("no CSV input given; pass --csv or set csv_path in {}", config.display()),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = load_settings(&cli.config)?.merge(&cli);

  if cli.migrate_people {
    let report = dvp_store_sqlite::split_people(&settings.db_path)
      .with_context(|| format!("migration of {} failed", settings.db_path.display()))?;
    return emit(&report, cli.json);
  }

  let csv_path = settings.csv_input(&cli.config)?;

  let records = dvp_csv::read_path(csv_path)
    .with_context(|| format!("failed to read {}", csv_path.display()))?;
  let report = dvp_store_sqlite::load(records, &settings.db_path)
    .with_context(|| format!("failed to build {}", settings.db_path.display()))?;

  emit(&report, cli.json)
}

fn emit<T: Serialize>(report: &T, json: bool) -> anyhow::Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(report)?);
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
