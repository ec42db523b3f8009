use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Substrings that mark a dashboard link as subscription-like. Matched as
/// plain substrings, not path segments.
const LINK_KEYWORDS: [&str; 3] = ["link", "subscribe", "sub"];

type Strategy = fn(&str, &Url, &str) -> Option<String>;

const STRATEGIES: [(&str, Strategy); 4] = [
  ("input-value", find_mu_input_value),
  ("path-keyword", find_path_keyword),
  ("href-keyword", find_href_keyword),
  ("anchor-scan", find_resolved_anchor),
];

/// Hunt for the machine-readable subscription URL inside an authenticated
/// dashboard page. Strategies run in order, from a precise template signature
/// down to increasingly permissive scans; the first hit wins and a total miss
/// is `None`, never an error.
pub fn extract_subscription_url(html: &str, base_url: &Url, mu_target: &str) -> Option<String> {
  for (name, strategy) in STRATEGIES {
    if let Some(found) = strategy(html, base_url, mu_target) {
      debug!("{name} strategy matched: {found}");
      return Some(found);
    }
  }
  None
}

/// Copy-to-clipboard inputs on the common panel template carry the per-format
/// subscription URL as `value="...?mu=<format>"`.
fn find_mu_input_value(html: &str, _base: &Url, mu_target: &str) -> Option<String> {
  let pattern = format!(r#"value="(https?://[^"]+\?mu={})""#, regex::escape(mu_target));
  let re = Regex::new(&pattern).ok()?;
  re.captures(html).map(|caps| caps[1].to_string())
}

/// Any absolute URL in the raw page text with a subscription-ish path segment.
fn find_path_keyword(html: &str, _base: &Url, _mu_target: &str) -> Option<String> {
  let re = Regex::new(r#"https?://[^\s<>"']+(?:/link/|/subscribe|/sub)[^\s<>"']*"#).ok()?;
  re.find(html).map(|m| m.as_str().to_string())
}

/// Absolute hrefs whose text contains a keyword anywhere, not only as a path
/// segment. Broader than the raw-text scan above.
fn find_href_keyword(html: &str, _base: &Url, _mu_target: &str) -> Option<String> {
  let re = Regex::new(r#"href="(https?://[^"]+)""#).ok()?;
  for caps in re.captures_iter(html) {
    let href = &caps[1];
    if contains_keyword(href) {
      return Some(href.to_string());
    }
  }
  None
}

/// Last resort: walk every anchor in the parsed document and resolve relative
/// paths against the page URL. Selector or join failures are swallowed; a
/// miss here is just "not found".
fn find_resolved_anchor(html: &str, base: &Url, _mu_target: &str) -> Option<String> {
  let document = Html::parse_document(html);
  let anchors = Selector::parse("a[href]").ok()?;

  for element in document.select(&anchors) {
    let Some(href) = element.value().attr("href") else {
      continue;
    };
    if !contains_keyword(href) {
      continue;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
      return Some(href.to_string());
    }
    if href.starts_with('/') {
      if let Ok(resolved) = base.join(href) {
        return Some(resolved.into());
      }
    }
  }
  None
}

fn contains_keyword(href: &str) -> bool {
  let lower = href.to_lowercase();
  LINK_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn base() -> Url {
    Url::parse("https://portal.example.com/user").unwrap()
  }

  #[test]
  fn input_value_signature_wins_over_later_strategies() {
    let html = r#"
      <a href="https://other.example.com/link/zzz">copy</a>
      <input type="text" value="https://x/y?mu=clash" readonly>
    "#;
    assert_eq!(
      extract_subscription_url(html, &base(), "clash").as_deref(),
      Some("https://x/y?mu=clash")
    );
  }

  #[test]
  fn path_keyword_found_in_raw_text() {
    let html = r#"<script>var sub = "https://cdn.example.com/link/abcdef";</script>"#;
    assert_eq!(
      extract_subscription_url(html, &base(), "clash").as_deref(),
      Some("https://cdn.example.com/link/abcdef")
    );
  }

  #[test]
  fn absolute_href_matched_by_keyword_substring() {
    // `/Subscribe` misses the case-sensitive path patterns but the href scan
    // lowercases before matching.
    let html = r#"<a href="https://files.example.com/client/Subscribe?token=1">get</a>"#;
    assert_eq!(
      extract_subscription_url(html, &base(), "clash").as_deref(),
      Some("https://files.example.com/client/Subscribe?token=1")
    );
  }

  #[test]
  fn relative_anchor_resolved_against_base() {
    let html = r#"<html><body><a href="/sub/abc">subscription</a></body></html>"#;
    assert_eq!(
      extract_subscription_url(html, &base(), "clash").as_deref(),
      Some("https://portal.example.com/sub/abc")
    );
  }

  #[test]
  fn non_resolvable_anchor_schemes_skipped() {
    let html = r##"<a href="mailto:sub@example.com">mail</a><a href="#subscribe">tab</a>"##;
    assert!(extract_subscription_url(html, &base(), "clash").is_none());
  }

  #[test]
  fn miss_everywhere_returns_none() {
    let html = r#"<html><body><h1>Dashboard</h1><a href="/billing">billing</a></body></html>"#;
    assert!(extract_subscription_url(html, &base(), "clash").is_none());
  }
}
