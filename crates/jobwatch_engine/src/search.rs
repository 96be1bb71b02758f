use std::time::Duration;

use jobwatch_core::{select_candidates, ProcessedLinkSet};
use jobwatch_logging::{watch_debug, watch_info};
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::decode::decode_html;
use crate::types::BROWSER_USER_AGENT;

pub const GOOGLE_SEARCH_ENDPOINT: &str = "https://www.google.com/search";

/// Recency filter applied by the search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    PastDay,
    #[default]
    PastWeek,
    PastMonth,
}

impl TimeWindow {
    /// Value of the provider's `tbs` parameter.
    pub fn token(self) -> &'static str {
        match self {
            TimeWindow::PastDay => "qdr:d",
            TimeWindow::PastWeek => "qdr:w",
            TimeWindow::PastMonth => "qdr:m",
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search endpoint: {0}")]
    Endpoint(String),
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search provider returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub endpoint: String,
    /// Result hosts on this domain (or its subdomains) are not job pages.
    pub provider_domain: String,
    /// `None` keeps the HTTP client default.
    pub request_timeout: Option<Duration>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: GOOGLE_SEARCH_ENDPOINT.to_string(),
            provider_domain: "google.com".to_string(),
            request_timeout: None,
        }
    }
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Candidate links for `query`, in result order, minus already processed ones.
    async fn search(
        &self,
        query: &str,
        window: TimeWindow,
        processed: &ProcessedLinkSet,
    ) -> Result<Vec<String>, SearchError>;
}

pub struct GoogleSearchClient {
    endpoint: Url,
    provider_domain: String,
    client: reqwest::Client,
}

impl GoogleSearchClient {
    pub fn new(settings: SearchSettings) -> Result<Self, SearchError> {
        let endpoint =
            Url::parse(&settings.endpoint).map_err(|err| SearchError::Endpoint(err.to_string()))?;

        let mut builder = reqwest::Client::builder().user_agent(BROWSER_USER_AGENT);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            endpoint,
            provider_domain: settings.provider_domain,
            client: builder.build()?,
        })
    }

    fn query_url(&self, query: &str, window: TimeWindow) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("tbs", window.token());
        url
    }
}

#[async_trait::async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(
        &self,
        query: &str,
        window: TimeWindow,
        processed: &ProcessedLinkSet,
    ) -> Result<Vec<String>, SearchError> {
        let url = self.query_url(query, window);
        watch_info!("Searching: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        let html = match decode_html(&bytes, content_type.as_deref()) {
            Ok(decoded) => decoded.html,
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        };

        let hits = redirect_targets(&html, &self.endpoint);
        watch_debug!("Search page carried {} redirect links", hits.len());
        Ok(select_candidates(hits, &self.provider_domain, processed))
    }
}

/// Destinations of the provider's `/url?q=<target>` redirect anchors, in document order.
///
/// Anchors are resolved against `endpoint`, so both relative and absolute
/// redirect hrefs on the provider host are recognized.
pub fn redirect_targets(html: &str, endpoint: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(anchor_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchor_sel)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| endpoint.join(href).ok())
        .filter(|resolved| resolved.host_str() == endpoint.host_str() && resolved.path() == "/url")
        .filter_map(|resolved| {
            resolved
                .query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, target)| target.into_owned())
        })
        .filter(|target| !target.is_empty())
        .collect()
}
