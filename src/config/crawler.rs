use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str =
    "https://x.com/i/api/graphql/-V26I6Pb5xDZ3C7BWwCQ_Q/UserTweets";

/// Settings for paging through the timeline endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// GraphQL `UserTweets` endpoint
    pub endpoint: String,

    /// Numeric id of the account being archived
    pub user_id: String,

    /// Posts requested per page (default: 20)
    pub page_size: u32,

    /// Stop once this many posts have been fetched (default: 2000)
    pub max_posts: usize,

    /// Fixed pause between page requests in milliseconds (default: 1000)
    pub delay_ms: u64,

    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Where pages, entries.json, posts.json and the database live.
    /// Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_id: String::new(),
            page_size: 20,
            max_posts: 2000,
            delay_ms: 1000,
            timeout_secs: 30,
            data_dir: None,
        }
    }
}

impl CrawlerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Credentials of the logged-in browser session, copied from its request headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// `authorization` header (the `Bearer ...` token)
    pub authorization: String,

    /// `cookie` header
    pub cookie: String,

    /// `x-csrf-token` header (the `ct0` cookie value)
    pub csrf_token: String,

    /// `x-twitter-client-language` header
    pub client_language: String,

    pub user_agent: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authorization: String::new(),
            cookie: String::new(),
            csrf_token: String::new(),
            client_language: "en".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)".to_string(),
        }
    }
}

impl AuthConfig {
    /// Names of required credentials that are still empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.authorization.trim().is_empty() {
            missing.push("authorization");
        }
        if self.cookie.trim().is_empty() {
            missing.push("cookie");
        }
        if self.csrf_token.trim().is_empty() {
            missing.push("csrf_token");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawler_defaults() {
        let config = CrawlerConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.user_id.is_empty());
        assert_eq!(config.page_size, 20);
        assert_eq!(config.max_posts, 2000);
        assert_eq!(config.delay(), Duration::from_millis(1000));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_auth_missing() {
        let auth = AuthConfig::default();
        assert_eq!(auth.missing(), vec!["authorization", "cookie", "csrf_token"]);

        let auth = AuthConfig {
            authorization: "Bearer abc".into(),
            cookie: "ct0=1".into(),
            csrf_token: "1".into(),
            ..Default::default()
        };
        assert!(auth.missing().is_empty());
    }
}
