//! Sidetree node configuration.
//!
//! The only configuration the write path needs is the multihash algorithm
//! code the node expects commitments and delta hashes to use.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidetreeConfig {
    pub multihash_algorithm: u64,
}

/// Fetches the configuration of a sidetree node.
#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn sidetree_config(&self, endpoint: &str) -> Result<SidetreeConfig, Error>;
}

/// Fetches configuration from the node's version endpoint.
pub struct HttpConfigService {
    http: reqwest::Client,
}

impl HttpConfigService {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ConfigService for HttpConfigService {
    async fn sidetree_config(&self, endpoint: &str) -> Result<SidetreeConfig, Error> {
        let url = format!("{}/version", endpoint.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::SidetreeConfigFailed(Box::new(e)))?;
        let response = response
            .error_for_status()
            .map_err(|e| Error::SidetreeConfigFailed(Box::new(e)))?;
        response
            .json()
            .await
            .map_err(|e| Error::SidetreeConfigFailed(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_decodes() {
        let config: SidetreeConfig =
            serde_json::from_str(r#"{"multihashAlgorithm":18}"#).unwrap();
        assert_eq!(config.multihash_algorithm, 18);
    }
}
