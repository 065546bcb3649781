//! Anchor endpoint resolution.
//!
//! Discovery produces candidate endpoints for a consortium domain and
//! selection narrows them. Production implementations of both live with
//! the consortium trust-bootstrap resolver; this crate consumes them
//! through the two traits so that any implementation (or a test double)
//! can be injected.

use async_trait::async_trait;

use crate::error::Error;

/// A sidetree anchor endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Produces candidate endpoints for a consortium domain.
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    async fn get_endpoints(&self, domain: &str) -> anyhow::Result<Vec<Endpoint>>;
}

/// Narrows candidate endpoints to those worth submitting to.
#[async_trait]
pub trait SelectionService: Send + Sync {
    async fn select_endpoints(
        &self,
        domain: &str,
        candidates: Vec<Endpoint>,
    ) -> anyhow::Result<Vec<Endpoint>>;
}

/// Resolves the endpoints for a domain.
#[async_trait]
pub trait EndpointService: Send + Sync {
    async fn endpoints(&self, domain: &str) -> Result<Vec<Endpoint>, Error>;
}

/// Discovery composed with selection.
pub struct EndpointRegistry {
    discovery: Box<dyn DiscoveryService>,
    selection: Box<dyn SelectionService>,
}

impl EndpointRegistry {
    pub fn new(
        discovery: impl DiscoveryService + 'static,
        selection: impl SelectionService + 'static,
    ) -> Self {
        Self {
            discovery: Box::new(discovery),
            selection: Box::new(selection),
        }
    }
}

#[async_trait]
impl EndpointService for EndpointRegistry {
    async fn endpoints(&self, domain: &str) -> Result<Vec<Endpoint>, Error> {
        let candidates = self
            .discovery
            .get_endpoints(domain)
            .await
            .map_err(|e| Error::EndpointDiscoveryFailed(e.into()))?;
        self.selection
            .select_endpoints(domain, candidates)
            .await
            .map_err(|e| Error::EndpointSelectionFailed(e.into()))
    }
}

/// Selection that keeps every candidate.
pub struct AcceptAllSelection;

#[async_trait]
impl SelectionService for AcceptAllSelection {
    async fn select_endpoints(
        &self,
        _domain: &str,
        candidates: Vec<Endpoint>,
    ) -> anyhow::Result<Vec<Endpoint>> {
        Ok(candidates)
    }
}

/// Default discovery that fails until a real implementation is injected.
pub struct UnconfiguredDiscovery;

#[async_trait]
impl DiscoveryService for UnconfiguredDiscovery {
    async fn get_endpoints(&self, _domain: &str) -> anyhow::Result<Vec<Endpoint>> {
        anyhow::bail!("no discovery service configured; inject one or supply a sidetree endpoint")
    }
}
