use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_SUBCONVERT_URL: &str = "http://65.49.200.39:25500/sub";

/// One cookie-authenticated airport dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct Airport {
  #[serde(default = "default_name")]
  pub name: String,
  #[serde(default)]
  pub url: String,
  #[serde(default)]
  pub cookie: String,
  #[serde(default)]
  pub user_agent: Option<String>,
  #[serde(default = "default_active")]
  pub active: bool,
}

impl Airport {
  /// An entry without a dashboard URL or session cookie can never log in.
  pub fn is_complete(&self) -> bool {
    !self.url.trim().is_empty() && !self.cookie.trim().is_empty()
  }
}

fn default_name() -> String {
  "unknown".to_string()
}

fn default_active() -> bool {
  true
}

pub fn parse_airports(raw: &str) -> Result<Vec<Airport>> {
  serde_json::from_str(raw).context("airport config must be a JSON array")
}

/// Airport definitions come from the config file when it exists, otherwise
/// from the AIRPORTS environment variable. A malformed source is logged and
/// treated as empty so a run with only local nodes can still proceed.
pub fn load_airports(path: &str) -> Vec<Airport> {
  if Path::new(path).exists() {
    let raw = match std::fs::read_to_string(path) {
      Ok(raw) => raw,
      Err(e) => {
        warn!("failed to read {path}: {e}");
        return Vec::new();
      }
    };
    return match parse_airports(&raw) {
      Ok(airports) => {
        info!("loaded {} airports from {path}", airports.len());
        airports
      }
      Err(e) => {
        warn!("failed to parse {path}: {e:#}");
        Vec::new()
      }
    };
  }

  match std::env::var("AIRPORTS") {
    Ok(raw) if !raw.trim().is_empty() => match parse_airports(&raw) {
      Ok(airports) => {
        info!("loaded {} airports from the AIRPORTS env var", airports.len());
        airports
      }
      Err(e) => {
        warn!("failed to parse the AIRPORTS env var: {e:#}");
        Vec::new()
      }
    },
    _ => Vec::new(),
  }
}

/// Pipe-delimited node URIs supplied directly through the environment.
pub fn local_nodes() -> String {
  std::env::var("LOCAL_NODES").unwrap_or_default()
}

pub fn subconvert_endpoint() -> String {
  match std::env::var("SUBCONVERT_URL") {
    Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
    _ => DEFAULT_SUBCONVERT_URL.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn airport_defaults_applied() {
    let airports =
      parse_airports(r#"[{"url":"https://a.example/user","cookie":"sid=1"}]"#).unwrap();
    assert_eq!(airports.len(), 1);
    let a = &airports[0];
    assert_eq!(a.name, "unknown");
    assert!(a.active);
    assert!(a.user_agent.is_none());
    assert!(a.is_complete());
  }

  #[test]
  fn non_array_config_rejected() {
    assert!(parse_airports(r#"{"url":"https://a.example"}"#).is_err());
    assert!(parse_airports("not json").is_err());
  }

  #[test]
  fn missing_cookie_marks_entry_incomplete() {
    let airports = parse_airports(r#"[{"name":"a","url":"https://a.example"}]"#).unwrap();
    assert!(!airports[0].is_complete());
  }

  #[test]
  fn inactive_flag_parsed() {
    let airports =
      parse_airports(r#"[{"url":"https://a.example","cookie":"c=1","active":false}]"#).unwrap();
    assert!(!airports[0].active);
  }
}
