//! robots.txt parsing and per-origin scoping.

use robotstxt::DefaultMatcher;
use url::Url;

/// The robots policy for one origin.
///
/// Wraps the raw robots.txt body; matching happens on demand. A policy
/// without a body allows every path, which is what an unreachable or
/// missing robots.txt degrades to.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    body: Option<String>,
}

impl RobotsPolicy {
    /// Policy parsed from a fetched robots.txt body.
    pub fn from_body(body: String) -> Self {
        Self { body: Some(body) }
    }

    /// Policy that allows every path.
    pub fn allow_all() -> Self {
        Self { body: None }
    }

    /// Whether `user_agent` may fetch `url` under this policy.
    pub fn allows(&self, user_agent: &str, url: &str) -> bool {
        match &self.body {
            Some(body) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, user_agent, url)
            }
            None => true,
        }
    }
}

/// The `scheme://host[:port]` prefix that scopes a robots.txt file.
///
/// Returns `None` for URLs that have no robots scope (non-HTTP schemes,
/// unparseable input).
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    Some(parsed.origin().ascii_serialization())
}

/// The robots.txt URL for an origin.
pub fn robots_url(origin: &str) -> String {
    format!("{}/robots.txt", origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UA: &str = "statacquire";

    #[test]
    fn allow_all_permits_everything() {
        let policy = RobotsPolicy::allow_all();
        assert!(policy.allows(UA, "https://example.org/private/secret.pdf"));
    }

    #[test]
    fn disallow_rules_apply_to_wildcard_agent() {
        let policy = RobotsPolicy::from_body(
            "User-agent: *\nDisallow: /private/\n".to_string(),
        );
        assert!(policy.allows(UA, "https://example.org/press-release"));
        assert!(!policy.allows(UA, "https://example.org/private/secret.pdf"));
    }

    #[test]
    fn agent_specific_rules_take_precedence() {
        let policy = RobotsPolicy::from_body(
            "User-agent: statacquire\nDisallow: /\n\nUser-agent: *\nAllow: /\n".to_string(),
        );
        assert!(!policy.allows(UA, "https://example.org/press-release"));
        assert!(policy.allows("otherbot", "https://example.org/press-release"));
    }

    #[test]
    fn origin_strips_path_and_keeps_port() {
        assert_eq!(
            origin_of("https://www.mospi.gov.in/press-release?page=2").as_deref(),
            Some("https://www.mospi.gov.in")
        );
        assert_eq!(
            origin_of("http://127.0.0.1:8080/listing").as_deref(),
            Some("http://127.0.0.1:8080")
        );
        assert_eq!(origin_of("mailto:someone@example.org"), None);
        assert_eq!(origin_of("not a url"), None);
    }

    #[test]
    fn robots_url_appends_well_known_path() {
        assert_eq!(
            robots_url("https://www.mospi.gov.in"),
            "https://www.mospi.gov.in/robots.txt"
        );
    }
}
