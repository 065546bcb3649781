//! Caller-facing key and service descriptors.
//!
//! A [`PublicKey`] describes one entry of the DID document under
//! construction: an id fragment, a verification-method type from the
//! closed tag set, a purpose set, and the key material itself. The
//! material may be raw bytes of the declared key type or an already-formed
//! JWK document; the codec decides which on inspection.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::jwk::{self, KeyKind, JWK};

/// Verification method types accepted by this method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum KeyType {
    /// Ed25519 key, 32-byte raw material.
    Ed25519VerificationKey2018,
    /// P-256 key, SEC1 uncompressed raw material.
    JwsVerificationKey2020,
}

impl KeyType {
    /// Key algorithm implied by the verification method type.
    pub fn kind(self) -> KeyKind {
        match self {
            KeyType::Ed25519VerificationKey2018 => KeyKind::Ed25519,
            KeyType::JwsVerificationKey2020 => KeyKind::P256,
        }
    }
}

/// Encoding of the key material inside a document entry.
///
/// JWK is the only encoding the anchoring nodes accept at present.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PublicKeyEncoding {
    #[default]
    Jwk,
}

/// Verification relationship of a document key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Purpose {
    Authentication,
    AssertionMethod,
    KeyAgreement,
    CapabilityInvocation,
    CapabilityDelegation,
}

/// A public key to be placed in the DID document.
#[derive(Debug, Clone)]
pub struct PublicKey {
    pub id: String,
    pub key_type: KeyType,
    pub encoding: PublicKeyEncoding,
    pub purposes: Vec<Purpose>,
    /// Raw key bytes, or a JWK document.
    pub value: Vec<u8>,
}

impl PublicKey {
    /// Decode the key material into a JWK.
    ///
    /// When the first non-whitespace byte is `{` and the bytes parse as a
    /// JWK, the embedded JWK is used and its curve must agree with the
    /// declared key type. Anything else is treated as raw bytes of the
    /// declared type and validated on-curve.
    pub fn jwk(&self) -> Result<JWK, Error> {
        let declared = self.key_type.kind();
        if looks_like_json_object(&self.value) {
            if let Ok(inner) = serde_json::from_slice::<JWK>(&self.value) {
                let found = jwk::classify(&inner)?;
                if found != declared {
                    return Err(Error::InvalidKeyMaterial(format!(
                        "unsupported public key source key type: JWK is {found:?} but declared type implies {declared:?}"
                    )));
                }
                return Ok(inner);
            }
        }
        match declared {
            KeyKind::Ed25519 => jwk::ed25519_parse(&self.value),
            KeyKind::P256 => jwk::p256_parse(&self.value),
        }
    }
}

fn looks_like_json_object(value: &[u8]) -> bool {
    value
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|b| *b == b'{')
        .unwrap_or(false)
}

/// A service endpoint to be placed in the DID document.
///
/// The `properties` bag (priority, routing keys, recipient keys, and the
/// like) passes through to the anchoring node uninterpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub service_endpoint: String,
    #[serde(flatten, default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::Params;

    fn descriptor(key_type: KeyType, value: Vec<u8>) -> PublicKey {
        PublicKey {
            id: "key1".to_string(),
            key_type,
            encoding: PublicKeyEncoding::Jwk,
            purposes: vec![Purpose::Authentication],
            value,
        }
    }

    #[test]
    fn raw_ed25519_value() {
        let sk = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let pk_bytes = sk.verifying_key().to_bytes().to_vec();
        let key = descriptor(KeyType::Ed25519VerificationKey2018, pk_bytes.clone());
        let jwk = key.jwk().unwrap();
        match jwk.params {
            Params::OKP(ref okp) => assert_eq!(okp.public_key.0, pk_bytes),
            _ => panic!("expected OKP params"),
        }
    }

    #[test]
    fn wrapped_jwk_value_is_unwrapped() {
        let value = br#"{
  "kty": "OKP",
  "crv": "Ed25519",
  "x": "G80iskrv_nE69qbGLSpeOHJgmV4MKIzsy5l5iT6pCww"
}"#;
        let key = descriptor(KeyType::Ed25519VerificationKey2018, value.to_vec());
        let jwk = key.jwk().unwrap();
        match jwk.params {
            Params::OKP(ref okp) => {
                assert_eq!(String::from(&okp.public_key), "G80iskrv_nE69qbGLSpeOHJgmV4MKIzsy5l5iT6pCww")
            }
            _ => panic!("expected OKP params"),
        }
    }

    #[test]
    fn wrapped_jwk_type_mismatch_rejected() {
        let value = br#"{
  "kty": "EC",
  "crv": "P-256",
  "x": "MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4",
  "y": "4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM"
}"#;
        let key = descriptor(KeyType::Ed25519VerificationKey2018, value.to_vec());
        let err = key.jwk().unwrap_err();
        match err {
            Error::InvalidKeyMaterial(msg) => {
                assert!(msg.contains("unsupported public key source key type"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_raw_value_rejected() {
        let key = descriptor(KeyType::JwsVerificationKey2020, vec![0u8; 12]);
        assert!(matches!(key.jwk(), Err(Error::InvalidKeyMaterial(_))));
    }

    #[test]
    fn ed25519_raw_value_with_p256_type_rejected() {
        let sk = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let key = descriptor(
            KeyType::JwsVerificationKey2020,
            sk.verifying_key().to_bytes().to_vec(),
        );
        assert!(matches!(key.jwk(), Err(Error::InvalidKeyMaterial(_))));
    }
}
