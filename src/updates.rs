use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::TomeError;
use crate::utils::logging::response_preview;

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A newer release than the running one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableUpdate {
    pub version: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// `Ok(None)` when the running version is current.
    async fn check(&self) -> Result<Option<AvailableUpdate>, TomeError>;
}

/// Reads `{version, notes}` from a JSON manifest URL.
pub struct ManifestUpdateSource {
    http: reqwest::Client,
    url: Url,
    current_version: String,
}

impl ManifestUpdateSource {
    pub fn new(url: Url) -> Result<Self, TomeError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tome/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_http(url, http, CURRENT_VERSION))
    }

    pub fn with_http(url: Url, http: reqwest::Client, current_version: impl Into<String>) -> Self {
        Self {
            http,
            url,
            current_version: current_version.into(),
        }
    }
}

#[async_trait]
impl UpdateSource for ManifestUpdateSource {
    async fn check(&self) -> Result<Option<AvailableUpdate>, TomeError> {
        let resp = self.http.get(self.url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = response_preview(resp).await;
            debug!(%status, body = %body, "Update manifest request rejected");
            return Err(TomeError::UpstreamStatus(status));
        }

        let manifest: AvailableUpdate = resp.json().await?;
        match compare_versions(&manifest.version, &self.current_version)? {
            Ordering::Greater => Ok(Some(manifest)),
            _ => Ok(None),
        }
    }
}

/// Compares dotted numeric versions; a leading `v` and any `-suffix` are ignored.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, TomeError> {
    let (a, b) = (parse_version(a)?, parse_version(b)?);
    let len = a.len().max(b.len());
    let part = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);
    Ok((0..len)
        .map(|i| part(&a, i).cmp(&part(&b, i)))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal))
}

fn parse_version(raw: &str) -> Result<Vec<u64>, TomeError> {
    let core = raw.trim().trim_start_matches('v');
    let core = core.split(['-', '+']).next().unwrap_or_default();
    core.split('.')
        .map(|p| {
            p.parse::<u64>()
                .map_err(|_| TomeError::UnexpectedError(format!("invalid version {raw:?}")))
        })
        .collect()
}

/// The pending update, or `None` if there is none or the check failed.
pub async fn available_update(source: &dyn UpdateSource) -> Option<AvailableUpdate> {
    match source.check().await {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Update check failed");
            None
        }
    }
}

/// Whether to skip the update prompt.
///
/// True without a source, without a pending update, when the pending version was skipped
/// by the user, and whenever the check itself fails.
pub async fn is_up_to_date(source: Option<&dyn UpdateSource>, skipped_versions: &[String]) -> bool {
    let Some(source) = source else {
        return true;
    };
    match available_update(source).await {
        None => true,
        Some(update) if skipped_versions.iter().any(|v| v == &update.version) => {
            info!(version = %update.version, "Update available but skipped");
            true
        }
        Some(update) => {
            info!(version = %update.version, "Update available");
            false
        }
    }
}
