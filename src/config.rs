use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/analyze";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("invalid analyze endpoint {endpoint:?}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("analyze endpoint must be http or https, got {}", endpoint.scheme());
        }
        Ok(Self { endpoint, timeout })
    }

    /// `timeout_secs == 0` disables the request timeout.
    pub fn from_args(endpoint: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
        Self::new(endpoint, timeout)
    }

    pub fn service_root(&self) -> Url {
        let mut root = self.endpoint.clone();
        root.set_path("/");
        root.set_query(None);
        root
    }
}
