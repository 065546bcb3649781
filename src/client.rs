//! The operation client.
//!
//! Stateless across calls: every operation is a pure function of its
//! arguments and the remote node. Validation runs in a fixed order so each
//! failure surfaces as the kind a caller expects: target presence,
//! required keys, unique suffix, endpoint resolution, node configuration,
//! key classification, payload construction, signing, submission.

use std::convert::TryFrom;

use tracing::debug;

use crate::config::{ConfigService, HttpConfigService};
use crate::document::{self, Document};
use crate::endpoint::{
    AcceptAllSelection, Endpoint, EndpointRegistry, EndpointService, UnconfiguredDiscovery,
};
use crate::error::Error;
use crate::operation::{self, OperationRequest, PublicKeyJwk};
use crate::options::{CreateOptions, DeactivateOptions, RecoverOptions, UpdateOptions};

/// TLS settings for the underlying HTTP client.
#[derive(Clone)]
pub struct TlsConfig {
    /// Extra root certificates to trust.
    pub root_certificates: Vec<reqwest::Certificate>,
    /// Whether the platform's certificate store is trusted as well.
    pub use_system_roots: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            root_certificates: Vec::new(),
            use_system_roots: true,
        }
    }
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    auth_token: Option<String>,
    tls: TlsConfig,
    endpoint_service: Option<Box<dyn EndpointService>>,
    config_service: Option<Box<dyn ConfigService>>,
}

impl ClientBuilder {
    /// Bearer token sent with every request to a sidetree node.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    pub fn endpoint_service(mut self, service: impl EndpointService + 'static) -> Self {
        self.endpoint_service = Some(Box::new(service));
        self
    }

    pub fn config_service(mut self, service: impl ConfigService + 'static) -> Self {
        self.config_service = Some(Box::new(service));
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let mut builder = reqwest::Client::builder();
        for certificate in self.tls.root_certificates {
            builder = builder.add_root_certificate(certificate);
        }
        if !self.tls.use_system_roots {
            builder = builder.tls_built_in_root_certs(false);
        }
        let http = builder
            .build()
            .map_err(|e| Error::HttpClient(Box::new(e)))?;
        let endpoint_service = self.endpoint_service.unwrap_or_else(|| {
            Box::new(EndpointRegistry::new(
                UnconfiguredDiscovery,
                AcceptAllSelection,
            ))
        });
        let config_service = self
            .config_service
            .unwrap_or_else(|| Box::new(HttpConfigService::new(http.clone())));
        Ok(Client {
            http,
            auth_token: self.auth_token,
            endpoint_service,
            config_service,
        })
    }
}

/// Sidetree DID operation client.
pub struct Client {
    http: reqwest::Client,
    auth_token: Option<String>,
    endpoint_service: Box<dyn EndpointService>,
    config_service: Box<dyn ConfigService>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a DID and return the document the anchoring node produced.
    pub async fn create_did(&self, domain: &str, opts: CreateOptions) -> Result<Document, Error> {
        ensure_target(domain, &opts.sidetree_endpoints)?;
        let recovery_key = opts
            .recovery_public_key
            .as_ref()
            .ok_or(Error::MissingKey("recovery public key"))?;
        let update_key = opts
            .update_public_key
            .as_ref()
            .ok_or(Error::MissingKey("update public key"))?;
        let endpoints = self
            .resolve_endpoints(domain, &opts.sidetree_endpoints)
            .await?;
        let config = self
            .config_service
            .sidetree_config(&endpoints[0].url)
            .await?;
        let recovery_pk = PublicKeyJwk::try_from(recovery_key)?;
        let update_pk = PublicKeyJwk::try_from(update_key)?;
        let document = operation::document_state(&opts.public_keys, &opts.services)?;
        let request = operation::create_request(
            document,
            &update_pk,
            &recovery_pk,
            config.multihash_algorithm,
        )?;
        let body = self.submit(&endpoints, &request).await?;
        document::from_create_response(&body)
    }

    /// Patch the document of an existing DID.
    pub async fn update_did(
        &self,
        did_uri: &str,
        domain: &str,
        opts: UpdateOptions,
    ) -> Result<(), Error> {
        ensure_target(domain, &opts.sidetree_endpoints)?;
        let signing_key = opts
            .signing_key
            .as_ref()
            .ok_or(Error::MissingKey("signing key"))?;
        let next_update_key = opts
            .next_update_public_key
            .as_ref()
            .ok_or(Error::MissingKey("next update public key"))?;
        let did_suffix = operation::unique_suffix(did_uri)?;
        let endpoints = self
            .resolve_endpoints(domain, &opts.sidetree_endpoints)
            .await?;
        let config = self
            .config_service
            .sidetree_config(&endpoints[0].url)
            .await?;
        crate::jwk::classify(signing_key)?;
        let next_update_pk = PublicKeyJwk::try_from(next_update_key)?;
        let patches = operation::update_patches(
            &opts.remove_public_key_ids,
            &opts.remove_service_ids,
            &opts.add_public_keys,
            &opts.add_services,
        )?;
        let request = operation::update_request(
            did_suffix,
            patches,
            signing_key,
            opts.signing_key_id.as_deref(),
            &next_update_pk,
            config.multihash_algorithm,
        )?;
        self.submit(&endpoints, &request).await?;
        Ok(())
    }

    /// Replace the document of an existing DID and rotate both key chains.
    /// Returns the updated document when the node sends one back.
    pub async fn recover_did(
        &self,
        did_uri: &str,
        domain: &str,
        opts: RecoverOptions,
    ) -> Result<Option<Document>, Error> {
        ensure_target(domain, &opts.sidetree_endpoints)?;
        let next_recovery_key = opts
            .next_recovery_public_key
            .as_ref()
            .ok_or(Error::MissingKey("next recovery public key"))?;
        let next_update_key = opts
            .next_update_public_key
            .as_ref()
            .ok_or(Error::MissingKey("next update public key"))?;
        let signing_key = opts
            .signing_key
            .as_ref()
            .ok_or(Error::MissingKey("signing key"))?;
        let did_suffix = operation::unique_suffix(did_uri)?;
        let endpoints = self
            .resolve_endpoints(domain, &opts.sidetree_endpoints)
            .await?;
        let config = self
            .config_service
            .sidetree_config(&endpoints[0].url)
            .await?;
        crate::jwk::classify(signing_key)?;
        let next_recovery_pk = PublicKeyJwk::try_from(next_recovery_key)?;
        let next_update_pk = PublicKeyJwk::try_from(next_update_key)?;
        let document = operation::document_state(&opts.public_keys, &opts.services)?;
        let request = operation::recover_request(
            did_suffix,
            document,
            signing_key,
            opts.signing_key_id.as_deref(),
            &next_update_pk,
            &next_recovery_pk,
            config.multihash_algorithm,
        )?;
        let body = self.submit(&endpoints, &request).await?;
        if body.is_empty() {
            return Ok(None);
        }
        Ok(document::from_create_response(&body).ok())
    }

    /// Deactivate a DID, consuming its recovery commitment.
    pub async fn deactivate_did(
        &self,
        did_uri: &str,
        domain: &str,
        opts: DeactivateOptions,
    ) -> Result<(), Error> {
        ensure_target(domain, &opts.sidetree_endpoints)?;
        let signing_key = opts
            .signing_key
            .as_ref()
            .ok_or(Error::MissingKey("signing key"))?;
        let did_suffix = operation::unique_suffix(did_uri)?;
        let endpoints = self
            .resolve_endpoints(domain, &opts.sidetree_endpoints)
            .await?;
        crate::jwk::classify(signing_key)?;
        let request = operation::deactivate_request(
            did_suffix,
            signing_key,
            opts.signing_key_id.as_deref(),
        )?;
        self.submit(&endpoints, &request).await?;
        Ok(())
    }

    /// Resolve the endpoints an operation will be submitted to.
    ///
    /// Caller-supplied endpoints are returned verbatim; only without them
    /// do discovery and selection run.
    async fn resolve_endpoints(
        &self,
        domain: &str,
        overrides: &[String],
    ) -> Result<Vec<Endpoint>, Error> {
        if !overrides.is_empty() {
            return Ok(overrides.iter().map(Endpoint::new).collect());
        }
        if domain.is_empty() {
            return Err(Error::DomainRequired);
        }
        let endpoints = self.endpoint_service.endpoints(domain).await?;
        if endpoints.is_empty() {
            return Err(Error::NoEndpoints);
        }
        debug!(domain, count = endpoints.len(), "resolved sidetree endpoints");
        Ok(endpoints)
    }

    /// POST the operation to each endpoint in order until one accepts it.
    /// The last error is kept when every endpoint fails.
    async fn submit(
        &self,
        endpoints: &[Endpoint],
        request: &OperationRequest,
    ) -> Result<Vec<u8>, Error> {
        let mut last_error: Option<anyhow::Error> = None;
        for endpoint in endpoints {
            let url = format!("{}/operations", endpoint.url.trim_end_matches('/'));
            debug!(%url, "submitting sidetree operation");
            let mut http_request = self
                .http
                .post(&url)
                .json(request)
                .header("Accept", "application/json")
                .header("User-Agent", crate::USER_AGENT);
            if let Some(token) = &self.auth_token {
                http_request = http_request.bearer_auth(token);
            }
            match http_request.send().await {
                Ok(response) if response.status().is_success() => {
                    let body = response
                        .bytes()
                        .await
                        .map_err(|e| Error::SubmissionFailed(Box::new(e)))?;
                    return Ok(body.to_vec());
                }
                Ok(response) => {
                    debug!(%url, status = %response.status(), "sidetree endpoint rejected operation");
                    last_error = Some(anyhow::anyhow!(
                        "got unexpected response from {url}: status {}",
                        response.status()
                    ));
                }
                Err(err) => {
                    debug!(%url, error = %err, "sidetree endpoint unreachable");
                    last_error =
                        Some(anyhow::Error::new(err).context(format!("failed to send request to {url}")));
                }
            }
        }
        let cause: Box<dyn std::error::Error + Send + Sync> = match last_error {
            Some(err) => err.into(),
            None => "no endpoints available".into(),
        };
        Err(Error::SubmissionFailed(cause))
    }
}

fn ensure_target(domain: &str, overrides: &[String]) -> Result<(), Error> {
    if domain.is_empty() && overrides.is_empty() {
        return Err(Error::DomainRequired);
    }
    Ok(())
}
