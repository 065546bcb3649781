//! Sidetree operation payloads and their construction.
//!
//! Four state-changing operations exist. Create and recover carry a full
//! document replacement; update carries incremental patches; deactivate
//! carries only a signed reveal. Every non-terminal operation commits to
//! the key that authorizes the next operation of its class, and every
//! non-create operation reveals the key whose commitment the previous
//! operation published.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::doc;
use crate::error::Error;
use crate::hashing;
use crate::jwk::{self, Params, JWK};
use crate::jws;

/// Public JWK as it appears in commitments, reveals, and document entries.
///
/// Holds only the public point; conversion from [`JWK`] validates the
/// material against its declared curve.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublicKeyJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl TryFrom<&JWK> for PublicKeyJwk {
    type Error = Error;

    fn try_from(key: &JWK) -> Result<Self, Self::Error> {
        jwk::classify(key)?;
        match &key.params {
            Params::OKP(okp) => {
                let _ = ed25519_dalek::VerifyingKey::try_from(okp)?;
                Ok(Self {
                    kty: "OKP".to_string(),
                    crv: "Ed25519".to_string(),
                    x: String::from(&okp.public_key),
                    y: None,
                })
            }
            Params::EC(ec) => {
                use p256::elliptic_curve::sec1::ToEncodedPoint;
                let pk = p256::PublicKey::try_from(ec)?;
                let point = pk.to_encoded_point(false);
                let (x, y) = match (point.x(), point.y()) {
                    (Some(x), Some(y)) => (x, y),
                    _ => {
                        return Err(Error::InvalidKeyMaterial(
                            "missing elliptic curve point in JWK".to_string(),
                        ))
                    }
                };
                Ok(Self {
                    kty: "EC".to_string(),
                    crv: "P-256".to_string(),
                    x: base64::encode_config(x, base64::URL_SAFE_NO_PAD),
                    y: Some(base64::encode_config(y, base64::URL_SAFE_NO_PAD)),
                })
            }
            Params::Symmetric(_) => Err(Error::UnsupportedKeyType),
        }
    }
}

/// Public key entry inside a document patch.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PublicKeyEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: doc::KeyType,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub purposes: Vec<doc::Purpose>,
    pub public_key_jwk: PublicKeyJwk,
}

impl TryFrom<&doc::PublicKey> for PublicKeyEntry {
    type Error = Error;

    fn try_from(key: &doc::PublicKey) -> Result<Self, Self::Error> {
        let jwk = key.jwk()?;
        let public_key_jwk = PublicKeyJwk::try_from(&jwk)?;
        Ok(Self {
            id: key.id.clone(),
            key_type: key.key_type,
            purposes: key.purposes.clone(),
            public_key_jwk,
        })
    }
}

/// Service entry inside a document patch.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceEndpointEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub service_endpoint: String,
    #[serde(flatten, default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl From<&doc::Service> for ServiceEndpointEntry {
    fn from(service: &doc::Service) -> Self {
        Self {
            id: service.id.clone(),
            service_type: service.service_type.clone(),
            service_endpoint: service.service_endpoint.clone(),
            properties: service.properties.clone(),
        }
    }
}

/// Document state carried by a `replace-document` patch.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DocumentState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_keys: Option<Vec<PublicKeyEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<ServiceEndpointEntry>>,
}

/// Elementary document patch.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "action")]
#[serde(rename_all = "kebab-case")]
pub enum Patch {
    ReplaceDocument { document: DocumentState },
    AddPublicKeys { public_keys: Vec<PublicKeyEntry> },
    RemovePublicKeys { ids: Vec<String> },
    AddServices { services: Vec<ServiceEndpointEntry> },
    RemoveServices { ids: Vec<String> },
}

/// Create/update/recover delta object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Delta {
    pub patches: Vec<Patch>,
    /// Commitment authorizing the next update.
    pub update_commitment: String,
}

/// Create operation suffix data object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SuffixData {
    /// Multihash of the canonicalized delta object.
    pub delta_hash: String,
    /// Commitment authorizing the next recover or deactivate.
    pub recovery_commitment: String,
}

/// Signed payload of an update operation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateClaims {
    /// Reveal: key matching the previous update commitment.
    pub update_key: PublicKeyJwk,
    pub delta_hash: String,
}

/// Signed payload of a recover operation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecoveryClaims {
    /// Reveal: key matching the previous recovery commitment.
    pub recovery_key: PublicKeyJwk,
    /// Commitment authorizing the next recover or deactivate.
    pub recovery_commitment: String,
    pub delta_hash: String,
}

/// Signed payload of a deactivate operation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeactivateClaims {
    pub did_suffix: String,
    /// Reveal: key matching the previous recovery commitment.
    pub recovery_key: PublicKeyJwk,
}

/// Operation request as POSTed to a sidetree node.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
pub enum OperationRequest {
    Create {
        suffix_data: SuffixData,
        delta: Delta,
    },
    Update {
        did_suffix: String,
        delta: Delta,
        signed_data: String,
    },
    Recover {
        did_suffix: String,
        delta: Delta,
        signed_data: String,
    },
    Deactivate {
        did_suffix: String,
        signed_data: String,
    },
}

/// Commitment to a public key: multihash of its canonical JWK encoding.
pub fn commitment(key: &PublicKeyJwk, algorithm: u64) -> Result<String, Error> {
    let canonical = hashing::canonicalize(key)?;
    hashing::encoded_multihash(algorithm, canonical.as_bytes())
}

/// Extract the unique suffix (last colon-separated segment) from a DID URI.
pub fn unique_suffix(did_uri: &str) -> Result<String, Error> {
    match did_uri.rsplit_once(':') {
        Some((_, suffix)) if !suffix.is_empty() => Ok(suffix.to_string()),
        _ => Err(Error::MalformedDid(did_uri.to_string())),
    }
}

/// Convert caller descriptors into the document state of a
/// `replace-document` patch.
pub fn document_state(
    public_keys: &[doc::PublicKey],
    services: &[doc::Service],
) -> Result<DocumentState, Error> {
    let public_keys = public_keys
        .iter()
        .map(PublicKeyEntry::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let services: Vec<ServiceEndpointEntry> =
        services.iter().map(ServiceEndpointEntry::from).collect();
    Ok(DocumentState {
        public_keys: (!public_keys.is_empty()).then_some(public_keys),
        services: (!services.is_empty()).then_some(services),
    })
}

/// Assemble the ordered patch list of an update operation.
///
/// Removals come before additions so that a caller removing and re-adding
/// the same id ends with the added entry in place.
pub fn update_patches(
    remove_public_key_ids: &[String],
    remove_service_ids: &[String],
    add_public_keys: &[doc::PublicKey],
    add_services: &[doc::Service],
) -> Result<Vec<Patch>, Error> {
    let mut patches = Vec::new();
    if !remove_public_key_ids.is_empty() {
        patches.push(Patch::RemovePublicKeys {
            ids: remove_public_key_ids.to_vec(),
        });
    }
    if !remove_service_ids.is_empty() {
        patches.push(Patch::RemoveServices {
            ids: remove_service_ids.to_vec(),
        });
    }
    if !add_public_keys.is_empty() {
        let public_keys = add_public_keys
            .iter()
            .map(PublicKeyEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        patches.push(Patch::AddPublicKeys { public_keys });
    }
    if !add_services.is_empty() {
        patches.push(Patch::AddServices {
            services: add_services.iter().map(ServiceEndpointEntry::from).collect(),
        });
    }
    Ok(patches)
}

fn delta_hash(delta: &Delta, algorithm: u64) -> Result<String, Error> {
    let canonical = hashing::canonicalize(delta)?;
    hashing::encoded_multihash(algorithm, canonical.as_bytes())
}

/// Build a create operation request.
///
/// Create is self-authenticating through the suffix and carries no
/// signature.
pub fn create_request(
    document: DocumentState,
    update_key: &PublicKeyJwk,
    recovery_key: &PublicKeyJwk,
    algorithm: u64,
) -> Result<OperationRequest, Error> {
    let update_commitment = commitment(update_key, algorithm)?;
    let delta = Delta {
        patches: vec![Patch::ReplaceDocument { document }],
        update_commitment,
    };
    let suffix_data = SuffixData {
        delta_hash: delta_hash(&delta, algorithm)?,
        recovery_commitment: commitment(recovery_key, algorithm)?,
    };
    Ok(OperationRequest::Create { suffix_data, delta })
}

/// Build and sign an update operation request.
pub fn update_request(
    did_suffix: String,
    patches: Vec<Patch>,
    signing_key: &JWK,
    signing_key_id: Option<&str>,
    next_update_key: &PublicKeyJwk,
    algorithm: u64,
) -> Result<OperationRequest, Error> {
    let kind = jwk::classify(signing_key)?;
    let delta = Delta {
        patches,
        update_commitment: commitment(next_update_key, algorithm)?,
    };
    let claims = UpdateClaims {
        update_key: PublicKeyJwk::try_from(&signing_key.to_public())?,
        delta_hash: delta_hash(&delta, algorithm)?,
    };
    let signed_data = jws::encode_sign(
        kind.algorithm(),
        &hashing::canonicalize(&claims)?,
        signing_key,
        signing_key_id,
    )?;
    Ok(OperationRequest::Update {
        did_suffix,
        delta,
        signed_data,
    })
}

/// Build and sign a recover operation request.
///
/// Recover replaces the document outright and rotates both commitment
/// chains: the next update commitment rides in the delta, the next
/// recovery commitment in the signed payload.
pub fn recover_request(
    did_suffix: String,
    document: DocumentState,
    signing_key: &JWK,
    signing_key_id: Option<&str>,
    next_update_key: &PublicKeyJwk,
    next_recovery_key: &PublicKeyJwk,
    algorithm: u64,
) -> Result<OperationRequest, Error> {
    let kind = jwk::classify(signing_key)?;
    let delta = Delta {
        patches: vec![Patch::ReplaceDocument { document }],
        update_commitment: commitment(next_update_key, algorithm)?,
    };
    let claims = RecoveryClaims {
        recovery_key: PublicKeyJwk::try_from(&signing_key.to_public())?,
        recovery_commitment: commitment(next_recovery_key, algorithm)?,
        delta_hash: delta_hash(&delta, algorithm)?,
    };
    let signed_data = jws::encode_sign(
        kind.algorithm(),
        &hashing::canonicalize(&claims)?,
        signing_key,
        signing_key_id,
    )?;
    Ok(OperationRequest::Recover {
        did_suffix,
        delta,
        signed_data,
    })
}

/// Build and sign a deactivate operation request. Deactivate has no delta
/// and commits to nothing; the signed payload carries only the reveal.
pub fn deactivate_request(
    did_suffix: String,
    signing_key: &JWK,
    signing_key_id: Option<&str>,
) -> Result<OperationRequest, Error> {
    let kind = jwk::classify(signing_key)?;
    let claims = DeactivateClaims {
        did_suffix: did_suffix.clone(),
        recovery_key: PublicKeyJwk::try_from(&signing_key.to_public())?,
    };
    let signed_data = jws::encode_sign(
        kind.algorithm(),
        &hashing::canonicalize(&claims)?,
        signing_key,
        signing_key_id,
    )?;
    Ok(OperationRequest::Deactivate {
        did_suffix,
        signed_data,
    })
}
