use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Build the run's subscriber: every run gets its own timestamped log file
/// next to a live console stream, both honoring the requested level. Returns
/// the log file path.
pub fn init(level: &str, log_dir: &str) -> Result<PathBuf> {
  create_dir_all(log_dir).with_context(|| format!("creating log directory {log_dir}"))?;

  let stamp = Local::now().format("%Y%m%d_%H%M%S");
  let path = Path::new(log_dir).join(format!("airsub_{stamp}.log"));
  let file =
    File::create(&path).with_context(|| format!("creating log file {}", path.display()))?;

  let file_layer = fmt::layer()
    .with_writer(Arc::new(file))
    .with_ansi(false)
    .with_filter(parse_filter(level));

  let stdout_layer = fmt::layer()
    .with_writer(std::io::stdout)
    .with_ansi(true)
    .with_filter(parse_filter(level));

  tracing_subscriber::registry()
    .with(file_layer)
    .with(stdout_layer)
    .try_init()
    .context("installing the tracing subscriber")?;

  Ok(path)
}

fn parse_filter(level: &str) -> EnvFilter {
  EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}
