use anyhow::{anyhow, Result};
use tracing::{info, warn};
use url::Url;

use crate::config::Airport;
use crate::extract;
use crate::fetch;

pub struct FetchOptions {
  pub timeout_ms: u64,
  /// Format probed for in the `?mu=` template signature (extraction strategy 1).
  pub mu_target: String,
  /// Fallback user agent for airports that do not pin their own.
  pub user_agent: String,
}

/// LOCAL_NODES holds whole node URIs separated by `|`.
pub fn split_local_nodes(raw: &str) -> Vec<String> {
  raw
    .split('|')
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .map(|s| s.to_string())
    .collect()
}

pub fn content_lines(content: &str) -> Vec<String> {
  content
    .lines()
    .map(|l| l.trim())
    .filter(|l| !l.is_empty())
    .map(|l| l.to_string())
    .collect()
}

/// Local nodes first, then every active airport in config order. A failure at
/// any stage drops that airport's contribution and nothing else.
pub async fn collect_nodes(
  airports: &[Airport],
  local_nodes: &str,
  options: &FetchOptions,
) -> Vec<String> {
  let mut nodes = split_local_nodes(local_nodes);
  if !nodes.is_empty() {
    info!("added {} local nodes", nodes.len());
  }

  for airport in airports {
    if !airport.active {
      info!("skipping inactive airport: {}", airport.name);
      continue;
    }
    if !airport.is_complete() {
      warn!("airport {} is missing a url or cookie, skipping", airport.name);
      continue;
    }
    match harvest_airport(airport, options).await {
      Ok(lines) => {
        info!("airport {} contributed {} nodes", airport.name, lines.len());
        nodes.extend(lines);
      }
      Err(e) => warn!("airport {} skipped: {e:#}", airport.name),
    }
  }

  nodes
}

async fn harvest_airport(airport: &Airport, options: &FetchOptions) -> Result<Vec<String>> {
  let user_agent = airport.user_agent.as_deref().unwrap_or(&options.user_agent);
  let client = fetch::build_client(user_agent, options.timeout_ms)?;

  let html = fetch::fetch_dashboard(&client, airport).await?;
  let base_url = Url::parse(&airport.url)?;
  let sub_url = extract::extract_subscription_url(&html, &base_url, &options.mu_target)
    .ok_or_else(|| anyhow!("no subscription url found on the dashboard page"))?;
  info!("found subscription url: {sub_url}");

  let content = fetch::fetch_subscription(&client, &sub_url).await?;
  Ok(content_lines(&content))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::parse_airports;

  #[test]
  fn local_nodes_split_and_trimmed() {
    assert_eq!(split_local_nodes("a | b |c"), vec!["a", "b", "c"]);
  }

  #[test]
  fn empty_local_nodes_yield_nothing() {
    assert!(split_local_nodes("").is_empty());
    assert!(split_local_nodes(" | | ").is_empty());
  }

  #[test]
  fn content_lines_normalized() {
    assert_eq!(content_lines("  n1  \n\n n2\r\n"), vec!["n1", "n2"]);
  }

  #[test]
  fn merged_output_keeps_source_order_and_drops_failed_sources() {
    let mut nodes = split_local_nodes("local1|local2");
    // First source failed somewhere along its pipeline, second succeeded.
    let fetched: [Option<&str>; 2] = [None, Some("n1\nn2")];
    for content in fetched.into_iter().flatten() {
      nodes.extend(content_lines(content));
    }
    assert_eq!(nodes, vec!["local1", "local2", "n1", "n2"]);
  }

  #[tokio::test]
  async fn collect_skips_incomplete_and_inactive_airports() {
    let airports = parse_airports(
      r#"[
        {"name":"no-cookie","url":"https://a.example/user"},
        {"name":"parked","url":"https://b.example/user","cookie":"sid=1","active":false}
      ]"#,
    )
    .unwrap();
    let options = FetchOptions {
      timeout_ms: 1000,
      mu_target: "clash".to_string(),
      user_agent: "test".to_string(),
    };
    let nodes = collect_nodes(&airports, "local1|local2", &options).await;
    assert_eq!(nodes, vec!["local1", "local2"]);
  }
}
