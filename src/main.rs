mod config;
mod convert;
mod extract;
mod fetch;
mod logging;
mod merge;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

/// Pull subscription links out of cookie-authenticated airport dashboards,
/// merge the recovered nodes with locally configured ones and print one
/// conversion-service URL per output format.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
  /// Airport definitions file (JSON array). The AIRPORTS env var is used when
  /// the file does not exist.
  #[arg(long, default_value = "config/airports.json")]
  airports: String,

  /// Output formats to build converter URLs for (comma separated).
  #[arg(long, default_value = "clash,v2ray,surge,surfboard")]
  targets: String,

  /// Request timeout (ms), applied to every dashboard and subscription GET.
  #[arg(long, default_value_t = 30_000)]
  timeout_ms: u64,

  /// Fallback User-Agent for airports without one of their own.
  #[arg(long)]
  user_agent: Option<String>,

  /// Log level for console and file output (tracing filter syntax).
  #[arg(long, default_value = "info")]
  log_level: String,

  /// Directory receiving one timestamped log file per run.
  #[arg(long, default_value = "logs")]
  log_dir: String,
}

fn parse_targets(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(|s| s.trim().to_lowercase())
    .filter(|s| !s.is_empty())
    .collect()
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let log_path = logging::init(&cli.log_level, &cli.log_dir)?;
  info!("logging to {}", log_path.display());
  run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
  let airports = config::load_airports(&cli.airports);
  let local_nodes = config::local_nodes();

  if airports.is_empty() && local_nodes.trim().is_empty() {
    error!("no airports configured and no local nodes; set AIRPORTS or LOCAL_NODES");
    return Ok(());
  }
  info!("{} airports configured", airports.len());

  let targets = parse_targets(&cli.targets);
  let options = merge::FetchOptions {
    timeout_ms: cli.timeout_ms,
    mu_target: targets.first().cloned().unwrap_or_else(|| "clash".to_string()),
    user_agent: cli
      .user_agent
      .clone()
      .unwrap_or_else(|| fetch::DEFAULT_USER_AGENT.to_string()),
  };

  let nodes = merge::collect_nodes(&airports, &local_nodes, &options).await;
  if nodes.is_empty() {
    error!("no nodes recovered from any source");
    return Ok(());
  }
  info!("merged {} nodes in total", nodes.len());

  let node_text = nodes.join("\n");
  let endpoint = config::subconvert_endpoint();
  for target in &targets {
    match convert::build_convert_url(&endpoint, target, &node_text) {
      Ok(converted) => info!("{}: {converted}", convert::display_name(target)),
      Err(e) => warn!("could not build {target} url: {e:#}"),
    }
  }

  Ok(())
}
