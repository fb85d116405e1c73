use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE,
};
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use crate::app::{ArchiveError, Result};
use crate::config::{AuthConfig, CrawlerConfig};
use crate::fetcher::Fetcher;

/// Feature flags the endpoint expects alongside the query variables.
fn features() -> Value {
    json!({
        "rweb_video_screen_enabled": false,
        "profile_label_improvements_pcf_label_in_post_enabled": true,
        "responsive_web_profile_redirect_enabled": false,
        "rweb_tipjar_consumption_enabled": true,
        "verified_phone_label_enabled": false,
        "creator_subscriptions_tweet_preview_api_enabled": true,
        "responsive_web_graphql_timeline_navigation_enabled": true,
        "responsive_web_graphql_skip_user_profile_image_extensions_enabled": false,
        "premium_content_api_read_enabled": false,
        "communities_web_enable_tweet_community_results_fetch": true,
        "c9s_tweet_anatomy_moderator_badge_enabled": true,
        "responsive_web_grok_analyze_button_fetch_trends_enabled": false,
        "responsive_web_grok_analyze_post_followups_enabled": true,
        "responsive_web_jetfuel_frame": true,
        "responsive_web_grok_share_attachment_enabled": true,
        "articles_preview_enabled": true,
        "responsive_web_edit_tweet_api_enabled": true,
        "graphql_is_translatable_rweb_tweet_is_translatable_enabled": true,
        "view_counts_everywhere_api_enabled": true,
        "longform_notetweets_consumption_enabled": true,
        "responsive_web_twitter_article_tweet_consumption_enabled": true,
        "tweet_awards_web_tipping_enabled": false,
        "responsive_web_grok_show_grok_translated_post": false,
        "responsive_web_grok_analysis_button_from_backend": true,
        "creator_subscriptions_quote_tweet_preview_enabled": false,
        "freedom_of_speech_not_reach_fetch_enabled": true,
        "standardized_nudges_misinfo": true,
        "tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled": true,
        "longform_notetweets_rich_text_read_enabled": true,
        "longform_notetweets_inline_media_enabled": true,
        "responsive_web_grok_image_annotation_enabled": true,
        "responsive_web_grok_imagine_annotation_enabled": true,
        "responsive_web_grok_community_note_auto_translation_is_enabled": false,
        "responsive_web_enhance_cards_enabled": false
    })
}

pub struct HttpFetcher {
    client: Client,
    endpoint: Url,
    user_id: String,
    page_size: u32,
}

impl HttpFetcher {
    pub fn new(crawler: &CrawlerConfig, auth: &AuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(crawler.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(auth.user_agent.as_str())
            .default_headers(session_headers(auth)?)
            .build()?;

        Ok(Self {
            client,
            endpoint: Url::parse(&crawler.endpoint)?,
            user_id: crawler.user_id.clone(),
            page_size: crawler.page_size,
        })
    }

    /// `{endpoint}?variables=...&features=...&fieldToggles=...`, each a JSON string.
    pub fn page_url(&self, cursor: Option<&str>) -> Url {
        let mut variables = json!({
            "userId": self.user_id,
            "count": self.page_size,
            "includePromotedContent": true,
            "withQuickPromoteEligibilityTweetFields": true,
            "withVoice": true,
        });
        if let Some(cursor) = cursor {
            variables["cursor"] = Value::String(cursor.to_string());
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("variables", &variables.to_string())
            .append_pair("features", &features().to_string())
            .append_pair(
                "fieldToggles",
                &json!({ "withArticlePlainText": false }).to_string(),
            );
        url
    }
}

fn session_headers(auth: &AuthConfig) -> Result<HeaderMap> {
    let header = |value: &str| {
        HeaderValue::from_str(value)
            .map_err(|e| ArchiveError::Config(format!("invalid header value: {}", e)))
    };

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, header(&auth.authorization)?);
    headers.insert(COOKIE, header(&auth.cookie)?);
    headers.insert(
        HeaderName::from_static("x-csrf-token"),
        header(&auth.csrf_token)?,
    );
    headers.insert(
        HeaderName::from_static("x-twitter-auth-type"),
        HeaderValue::from_static("OAuth2Session"),
    );
    headers.insert(
        HeaderName::from_static("x-twitter-active-user"),
        HeaderValue::from_static("yes"),
    );
    headers.insert(
        HeaderName::from_static("x-twitter-client-language"),
        header(&auth.client_language)?,
    );
    Ok(headers)
}

/// Turn a response body into a page, rejecting GraphQL error payloads.
pub fn parse_page(body: &[u8]) -> Result<Value> {
    let page: Value = serde_json::from_slice(body)?;
    if let Some(errors) = page.get("errors").filter(|e| !e.is_null()) {
        return Err(ArchiveError::Api(errors.to_string()));
    }
    Ok(page)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Value> {
        let url = self.page_url(cursor);
        tracing::debug!(cursor = cursor.unwrap_or("<first>"), "Requesting timeline page");

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let body = response.bytes().await?;
        parse_page(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        let crawler = CrawlerConfig {
            user_id: "12345".into(),
            page_size: 20,
            ..Default::default()
        };
        let auth = AuthConfig {
            authorization: "Bearer token".into(),
            cookie: "ct0=abc".into(),
            csrf_token: "abc".into(),
            ..Default::default()
        };
        HttpFetcher::new(&crawler, &auth).unwrap()
    }

    fn query_json(url: &Url, key: &str) -> Value {
        let (_, value) = url.query_pairs().find(|(k, _)| k == key).unwrap();
        serde_json::from_str(&value).unwrap()
    }

    #[test]
    fn test_first_page_url() {
        let url = fetcher().page_url(None);

        assert_eq!(url.host_str(), Some("x.com"));
        assert!(url.path().ends_with("/UserTweets"));
        let variables = query_json(&url, "variables");
        assert_eq!(variables["userId"], "12345");
        assert_eq!(variables["count"], 20);
        assert_eq!(variables["includePromotedContent"], true);
        assert!(variables.get("cursor").is_none());
        assert_eq!(
            query_json(&url, "features")["longform_notetweets_consumption_enabled"],
            true
        );
        assert_eq!(
            query_json(&url, "fieldToggles")["withArticlePlainText"],
            false
        );
    }

    #[test]
    fn test_next_page_url_carries_cursor() {
        let url = fetcher().page_url(Some("DAABCgABF"));
        assert_eq!(query_json(&url, "variables")["cursor"], "DAABCgABF");
    }

    #[test]
    fn test_invalid_header_value_is_config_error() {
        let auth = AuthConfig {
            cookie: "line\nbreak".into(),
            ..Default::default()
        };
        assert!(matches!(
            HttpFetcher::new(&CrawlerConfig::default(), &auth),
            Err(ArchiveError::Config(_))
        ));
    }

    #[test]
    fn test_parse_page_rejects_api_errors() {
        let body = br#"{"errors":[{"message":"Rate limit exceeded","code":88}]}"#;
        match parse_page(body) {
            Err(ArchiveError::Api(msg)) => assert!(msg.contains("Rate limit")),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_page_accepts_data() {
        let page = parse_page(br#"{"data":{"user":{}}}"#).unwrap();
        assert!(page.get("data").is_some());
        assert!(matches!(parse_page(b"<html>"), Err(ArchiveError::Json(_))));
    }
}
