//! Client configuration
//!
//! Every constant the remote API needs (endpoint, bearer token, feature
//! flags, client headers) plus the limits and delays of the fetch loop.
//! Values can be overridden from a YAML or JSON file; anything missing
//! keeps its default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Public bearer token used by the web client
pub const DEFAULT_BEARER_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

/// GraphQL query id of the bookmarks timeline
pub const DEFAULT_QUERY_ID: &str = "MhXAbUeE0RsRoCfv-bgscA";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Feature flags the bookmarks query refuses to run without
const DEFAULT_FEATURES: &[(&str, bool)] = &[
    ("rweb_video_screen_enabled", false),
    ("profile_label_improvements_pcf_label_in_post_enabled", true),
    ("responsive_web_profile_redirect_enabled", false),
    ("rweb_tipjar_consumption_enabled", false),
    ("verified_phone_label_enabled", false),
    ("creator_subscriptions_tweet_preview_api_enabled", true),
    ("responsive_web_graphql_timeline_navigation_enabled", true),
    ("responsive_web_graphql_skip_user_profile_image_extensions_enabled", false),
    ("premium_content_api_read_enabled", false),
    ("communities_web_enable_tweet_community_results_fetch", true),
    ("c9s_tweet_anatomy_moderator_badge_enabled", true),
    ("responsive_web_grok_analyze_button_fetch_trends_enabled", false),
    ("responsive_web_grok_analyze_post_followups_enabled", true),
    ("responsive_web_jetfuel_frame", true),
    ("responsive_web_grok_share_attachment_enabled", true),
    ("responsive_web_grok_annotations_enabled", true),
    ("articles_preview_enabled", true),
    ("responsive_web_edit_tweet_api_enabled", true),
    ("graphql_is_translatable_rweb_tweet_is_translatable_enabled", true),
    ("view_counts_everywhere_api_enabled", true),
    ("longform_notetweets_consumption_enabled", true),
    ("responsive_web_twitter_article_tweet_consumption_enabled", true),
    ("tweet_awards_web_tipping_enabled", false),
    ("responsive_web_grok_show_grok_translated_post", false),
    ("responsive_web_grok_analysis_button_from_backend", true),
    ("post_ctas_fetch_enabled", true),
    ("freedom_of_speech_not_reach_fetch_enabled", true),
    ("standardized_nudges_misinfo", true),
    ("tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled", true),
    ("longform_notetweets_rich_text_read_enabled", true),
    ("longform_notetweets_inline_media_enabled", true),
    ("responsive_web_grok_image_annotation_enabled", true),
    ("responsive_web_grok_imagine_annotation_enabled", true),
    ("responsive_web_grok_community_note_auto_translation_is_enabled", false),
    ("responsive_web_enhance_cards_enabled", false),
];

// ============================================================================
// Client Config
// ============================================================================

/// Immutable configuration shared by the session builder and the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Site root, also used for the referer and canonical post URLs
    pub base_url: String,
    pub graphql_path: String,
    pub query_id: String,
    pub operation: String,
    pub bearer_token: String,
    pub client_language: String,
    pub user_agent: String,
    pub referer_path: String,
    /// Opaque feature-flag map sent verbatim with every request
    pub features: BTreeMap<String, bool>,
    pub page_size: u32,
    pub include_promoted_content: bool,
    pub max_pages: u32,
    pub request_timeout_secs: u64,
    /// Fallback wait after a 429
    pub rate_limit_backoff_secs: u64,
    /// Wait longer than the fallback when a numeric `retry-after` asks for it
    pub honor_retry_after: bool,
    /// Consecutive 429s tolerated for one page; `None` retries forever
    pub max_rate_limit_retries: Option<u32>,
    pub politeness_delay_ms: u64,
    /// Characters of an error body kept for diagnostics
    pub error_body_snippet: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://x.com".to_string(),
            graphql_path: "/i/api/graphql".to_string(),
            query_id: DEFAULT_QUERY_ID.to_string(),
            operation: "Bookmarks".to_string(),
            bearer_token: DEFAULT_BEARER_TOKEN.to_string(),
            client_language: "en".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer_path: "/i/bookmarks".to_string(),
            features: default_features(),
            page_size: 100,
            include_promoted_content: false,
            max_pages: 50,
            request_timeout_secs: 30,
            rate_limit_backoff_secs: 60,
            honor_retry_after: true,
            max_rate_limit_retries: None,
            politeness_delay_ms: 1000,
            error_body_snippet: 200,
        }
    }
}

/// The built-in feature-flag map
pub fn default_features() -> BTreeMap<String, bool> {
    DEFAULT_FEATURES
        .iter()
        .map(|(name, enabled)| ((*name).to_string(), *enabled))
        .collect()
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load overrides from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {e}", path.display()))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config: Self = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the fetch loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::config("page_size must be greater than 0"));
        }
        if self.max_pages == 0 {
            return Err(Error::config("max_pages must be greater than 0"));
        }
        if self.query_id.trim().is_empty() {
            return Err(Error::config("query_id must not be empty"));
        }
        self.base()?;
        Ok(())
    }

    /// Parsed site root
    pub fn base(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// `{base_url}{graphql_path}/{query_id}/{operation}`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.graphql_path.trim_matches('/'),
            self.query_id,
            self.operation
        )
    }

    pub fn referer(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.referer_path.trim_start_matches('/')
        )
    }

    /// Permalink of a post
    pub fn status_url(&self, handle: &str, id: &str) -> String {
        format!(
            "{}/{handle}/status/{id}",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.rate_limit_backoff_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ClientConfig`]
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the site root
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    #[must_use]
    pub fn query_id(mut self, id: impl Into<String>) -> Self {
        self.config.query_id = id.into();
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.bearer_token = token.into();
        self
    }

    #[must_use]
    pub fn client_language(mut self, language: impl Into<String>) -> Self {
        self.config.client_language = language.into();
        self
    }

    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.config.page_size = size;
        self
    }

    #[must_use]
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.config.max_pages = pages;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    #[must_use]
    pub fn rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.config.rate_limit_backoff_secs = backoff.as_secs();
        self
    }

    #[must_use]
    pub fn honor_retry_after(mut self, honor: bool) -> Self {
        self.config.honor_retry_after = honor;
        self
    }

    #[must_use]
    pub fn max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.config.max_rate_limit_retries = Some(retries);
        self
    }

    #[must_use]
    pub fn politeness_delay(mut self, delay: Duration) -> Self {
        self.config.politeness_delay_ms = delay.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn feature(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.config.features.insert(name.into(), enabled);
        self
    }

    /// Build and validate the config
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
