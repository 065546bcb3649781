//! Error type for the operation client.

use thiserror::Error;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Error type for every operation exposed by this crate.
///
/// Each failure mode a caller may want to branch on is a distinct variant;
/// the underlying cause, when one exists, is preserved as a source.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No consortium domain and no explicit sidetree endpoint were given.
    #[error("domain is empty")]
    DomainRequired,
    /// A key option required by the operation is absent.
    #[error("{0} is required")]
    MissingKey(&'static str),
    /// The DID URI has no colon-separated unique suffix.
    #[error("unique suffix not provided in id [{0}]")]
    MalformedDid(String),
    /// Key type is outside the supported set.
    #[error("key not supported")]
    UnsupportedKeyType,
    /// Elliptic curve is outside the supported set.
    #[error("elliptic curve not supported: '{0}'")]
    UnsupportedCurve(String),
    /// Key material did not decode to a valid key of the declared type.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
    /// Unable to produce canonical JSON for hashing or signing.
    #[error("unable to canonicalize JSON: {0}")]
    Canonicalization(#[source] serde_json::Error),
    /// Sidetree node configuration could not be fetched or decoded.
    #[error("failed to get sidetree config: {0}")]
    SidetreeConfigFailed(#[source] Cause),
    /// The discovery collaborator failed.
    #[error("endpoint discovery failed: {0}")]
    EndpointDiscoveryFailed(#[source] Cause),
    /// The selection collaborator failed.
    #[error("endpoint selection failed: {0}")]
    EndpointSelectionFailed(#[source] Cause),
    /// Endpoint resolution completed but produced nothing to submit to.
    #[error("list of endpoints is empty")]
    NoEndpoints,
    /// The signer rejected the key or failed to produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(#[source] Cause),
    /// Every resolved endpoint failed; holds the last error observed.
    #[error("failed to send operation request: {0}")]
    SubmissionFailed(#[source] Cause),
    /// The create response body is not a DID document or resolution result.
    #[error("failed to parse DID document from create response: {0}")]
    ResponseParseFailed(#[source] Cause),
    /// The underlying HTTP client could not be constructed.
    #[error("failed to construct HTTP client: {0}")]
    HttpClient(#[source] Cause),
}
