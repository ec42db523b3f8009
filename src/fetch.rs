use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Airport;

pub const DEFAULT_USER_AGENT: &str =
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

pub fn build_client(user_agent: &str, timeout_ms: u64) -> Result<Client> {
  let client = Client::builder()
    .user_agent(user_agent)
    .redirect(reqwest::redirect::Policy::limited(10))
    .timeout(Duration::from_millis(timeout_ms.max(1)))
    .build()?;
  Ok(client)
}

/// One authenticated GET against the dashboard. The cookie goes out verbatim
/// as a header value; there is no login flow and no retry.
pub async fn fetch_dashboard(client: &Client, airport: &Airport) -> Result<String> {
  info!("visiting dashboard: {}", airport.url);
  let resp = client
    .get(&airport.url)
    .header("cookie", &airport.cookie)
    .header("accept", ACCEPT_HTML)
    .header("accept-language", ACCEPT_LANGUAGE)
    .send()
    .await
    .with_context(|| format!("dashboard request to {} failed", airport.url))?;

  let status = resp.status();
  if !status.is_success() {
    return Err(anyhow!("dashboard returned http {}", status.as_u16()));
  }
  debug!("dashboard responded http {}", status.as_u16());
  resp.text().await.context("reading dashboard body")
}

/// GET the extracted subscription URL and normalize its body to plaintext.
pub async fn fetch_subscription(client: &Client, sub_url: &str) -> Result<String> {
  info!("fetching subscription content: {sub_url}");
  let resp = client
    .get(sub_url)
    .send()
    .await
    .with_context(|| format!("subscription request to {sub_url} failed"))?;

  let status = resp.status();
  if !status.is_success() {
    return Err(anyhow!("subscription endpoint returned http {}", status.as_u16()));
  }
  let body = resp.text().await.context("reading subscription body")?;
  Ok(decode_subscription_body(&body))
}

/// Subscription bodies are usually one base64 blob over the whole node list,
/// but some panels serve plaintext URIs directly. Try to decode and fall back
/// to the raw body on any mismatch; ambiguity here is not an error.
pub fn decode_subscription_body(body: &str) -> String {
  let trimmed = body.trim();
  if trimmed.is_empty() || trimmed.contains("://") {
    return body.to_string();
  }
  match decode_base64_to_utf8(trimmed) {
    Some(decoded) => {
      debug!("subscription body decoded from base64");
      decoded
    }
    None => body.to_string(),
  }
}

fn decode_base64_to_utf8(s: &str) -> Option<String> {
  let compact: String = s.split_whitespace().collect();
  if compact.is_empty() {
    return None;
  }

  let mut candidates = vec![compact.clone()];
  // Panels routinely strip the trailing padding; restore it before decoding.
  let rem = compact.len() % 4;
  if rem != 0 {
    candidates.push(format!("{compact}{}", "=".repeat(4 - rem)));
  }

  for cand in candidates {
    for engine in [&general_purpose::STANDARD, &general_purpose::URL_SAFE] {
      let Ok(bytes) = engine.decode(&cand) else {
        continue;
      };
      if let Ok(text) = String::from_utf8(bytes) {
        if !text.trim().is_empty() {
          return Some(text);
        }
      }
    }
  }
  None
}
