use backon::ExponentialBuilder;
use tome_schema::{Server, ServerList};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::RegistryConfig;
use crate::error::TomeError;
use crate::providers::{get_with_retry, retry_policy};
use crate::utils::logging::{response_preview, with_pretty_json_debug};

use super::query::{LOCAL_ONLY_FILTER, listing_query, search_terms};

const PROVIDER: &str = "registry";

/// Read-only client for the MCP server registry.
///
/// Without an API key the registry only lists servers that run locally.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    page_size: u32,
    retry_policy: ExponentialBuilder,
}

impl RegistryClient {
    pub fn new(cfg: &RegistryConfig) -> Result<Self, TomeError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tome/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(std::time::Duration::from_secs(5))
            .timeout(cfg.timeout())
            .build()?;
        Ok(Self::with_http(cfg, http))
    }

    pub fn with_http(cfg: &RegistryConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: cfg.base_url.clone(),
            api_key: cfg
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            page_size: cfg.page_size,
            retry_policy: retry_policy(cfg.retry_max_times),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn implicit_filter(&self) -> Option<&'static str> {
        if self.is_authenticated() {
            None
        } else {
            Some(LOCAL_ONLY_FILTER)
        }
    }

    /// One page of servers.
    pub async fn servers(&self, page: u32) -> Result<ServerList, TomeError> {
        let terms = search_terms(self.implicit_filter(), None);
        self.list(&terms, self.page_size, page).await
    }

    /// One page of servers matching free text.
    pub async fn search(&self, text: &str, page: u32) -> Result<ServerList, TomeError> {
        let terms = search_terms(self.implicit_filter(), Some(text));
        self.list(&terms, self.page_size, page).await
    }

    /// Full record for one server, e.g. `@owner/name`.
    pub async fn server(&self, qualified_name: &str) -> Result<Server, TomeError> {
        let mut segments = vec!["servers"];
        segments.extend(qualified_name.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(&segments)?;

        let bytes = self.fetch(&url).await?;
        let server: Server = serde_json::from_slice(&bytes)?;
        with_pretty_json_debug(&server, |json| {
            debug!(qualified_name, "[registry] Server detail:\n{json}");
        });
        Ok(server)
    }

    /// Smallest possible listing; fails on any transport or status problem.
    pub async fn check(&self) -> Result<(), TomeError> {
        let terms = search_terms(self.implicit_filter(), None);
        self.list(&terms, 1, 1).await.map(|_| ())
    }

    /// Whether the registry is reachable and accepts our credentials.
    pub async fn test(&self) -> bool {
        match self.check().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, authenticated = self.is_authenticated(), "Registry check failed");
                false
            }
        }
    }

    async fn list(&self, terms: &str, page_size: u32, page: u32) -> Result<ServerList, TomeError> {
        let mut url = self.endpoint(&["servers"])?;
        url.set_query(Some(&listing_query(terms, page_size, page)));

        let bytes = self.fetch(&url).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            info!(query = ?url.query(), "Registry returned an empty body");
            return Ok(ServerList::empty(page_size));
        }

        match serde_json::from_slice::<ServerList>(&bytes) {
            Ok(list) => {
                debug!(
                    query = ?url.query(),
                    count = list.servers.len(),
                    total = list.pagination.total_count,
                    "[registry] Servers fetched"
                );
                Ok(list)
            }
            Err(e) => {
                warn!(query = ?url.query(), error = %e, "Registry returned a malformed body");
                Ok(ServerList::empty(page_size))
            }
        }
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, TomeError> {
        let resp = get_with_retry(
            PROVIDER,
            &self.http,
            url,
            self.api_key.as_deref(),
            self.retry_policy,
        )
        .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = response_preview(resp).await;
            warn!(%status, path = %url.path(), body = %body, "Registry request rejected");
            return Err(TomeError::UpstreamStatus(status));
        }
        Ok(resp.bytes().await?.to_vec())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TomeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                TomeError::UnexpectedError(format!("cannot-be-a-base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
