use anyhow::{Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use url::Url;

/// Formats accepted by the conversion service, paired with the display names
/// used in the emitted report.
pub const TARGET_FORMATS: [(&str, &str); 4] = [
  ("clash", "Clash"),
  ("v2ray", "V2Ray"),
  ("surge", "Surge"),
  ("surfboard", "Surfboard"),
];

const REMOTE_RULESET: &str =
  "https://raw.githubusercontent.com/ACL4SSR/ACL4SSR/master/Clash/config/ACL4SSR_Online.ini";

pub fn display_name(target: &str) -> &str {
  TARGET_FORMATS
    .iter()
    .find(|(id, _)| *id == target)
    .map(|(_, name)| *name)
    .unwrap_or(target)
}

/// The node blob travels base64-encoded inside the `url` query parameter; the
/// remaining flags mirror what the conversion service expects for a plain
/// node-list input.
pub fn build_convert_url(endpoint: &str, target: &str, node_text: &str) -> Result<String> {
  let encoded = general_purpose::STANDARD.encode(node_text);
  let mut url =
    Url::parse(endpoint).with_context(|| format!("invalid conversion endpoint: {endpoint}"))?;

  url
    .query_pairs_mut()
    .append_pair("target", target)
    .append_pair("url", &encoded)
    .append_pair("insert", "false")
    .append_pair("config", REMOTE_RULESET)
    .append_pair("emoji", "true")
    .append_pair("list", "false")
    .append_pair("udp", "true")
    .append_pair("tfo", "false")
    .append_pair("scv", "false")
    .append_pair("fdn", "false")
    .append_pair("sort", "false");

  Ok(url.into())
}
