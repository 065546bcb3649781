//! Compact JWS production for signed operation data.

// RFC 7515 - JSON Web Signature (JWS)

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::jwk::{Algorithm, Params, JWK};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Header {
    #[serde(rename = "alg")]
    pub algorithm: Algorithm,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
}

fn base64_encode_json<T: Serialize>(object: &T) -> Result<String, Error> {
    let json = serde_json::to_string(&object).map_err(Error::Canonicalization)?;
    Ok(base64::encode_config(json, base64::URL_SAFE_NO_PAD))
}

/// Sign data with the given algorithm and key.
///
/// The algorithm must agree with the key's curve; any mismatch is rejected
/// before key material is touched.
pub fn sign_bytes(algorithm: Algorithm, data: &[u8], key: &JWK) -> Result<Vec<u8>, Error> {
    match (&key.params, algorithm) {
        (Params::OKP(okp), Algorithm::EdDSA) => {
            if okp.curve != *"Ed25519" {
                return Err(Error::UnsupportedCurve(okp.curve.to_string()));
            }
            let secret = ed25519_dalek::SigningKey::try_from(okp)?;
            use ed25519_dalek::Signer;
            Ok(secret.sign(data).to_bytes().to_vec())
        }
        (Params::EC(ec), Algorithm::ES256) => {
            use p256::ecdsa::signature::Signer;
            let secret_key = p256::SecretKey::try_from(ec)?;
            let signing_key = p256::ecdsa::SigningKey::from(secret_key);
            let signature: p256::ecdsa::Signature = signing_key
                .try_sign(data)
                .map_err(|e| Error::SigningFailed(Box::new(e)))?;
            Ok(signature.to_bytes().to_vec())
        }
        _ => Err(Error::SigningFailed(
            "signature algorithm does not match the signing key".into(),
        )),
    }
}

pub fn sign_bytes_b64(algorithm: Algorithm, data: &[u8], key: &JWK) -> Result<String, Error> {
    let signature = sign_bytes(algorithm, data, key)?;
    Ok(base64::encode_config(signature, base64::URL_SAFE_NO_PAD))
}

/// Produce a compact JWS (`header.payload.signature`, all three segments
/// base64url-encoded) over the given payload string.
pub fn encode_sign(
    algorithm: Algorithm,
    payload: &str,
    key: &JWK,
    key_id: Option<&str>,
) -> Result<String, Error> {
    let header = Header {
        algorithm,
        key_id: key_id.map(ToOwned::to_owned).or_else(|| key.key_id.clone()),
    };
    let header_b64 = base64_encode_json(&header)?;
    let payload_b64 = base64::encode_config(payload, base64::URL_SAFE_NO_PAD);
    let signing_input = header_b64 + "." + &payload_b64;
    let sig_b64 = sign_bytes_b64(header.algorithm, signing_input.as_bytes(), key)?;
    Ok([signing_input, sig_b64].join("."))
}

/// Split a compact JWS into its three segments.
pub fn split_jws(jws: &str) -> Result<(&str, &str, &str), Error> {
    let mut parts = jws.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), Some(c)) => Ok((a, b, c)),
        _ => Err(Error::SigningFailed("unable to split JWS".into())),
    }
}

/// Verify a signature produced by [`sign_bytes`].
pub fn verify_bytes(
    algorithm: Algorithm,
    data: &[u8],
    key: &JWK,
    signature: &[u8],
) -> Result<(), Error> {
    match (&key.params, algorithm) {
        (Params::OKP(okp), Algorithm::EdDSA) => {
            use ed25519_dalek::Verifier;
            let public_key = ed25519_dalek::VerifyingKey::try_from(okp)?;
            let signature = ed25519_dalek::Signature::from_slice(signature)
                .map_err(|e| Error::SigningFailed(Box::new(e)))?;
            public_key
                .verify(data, &signature)
                .map_err(|e| Error::SigningFailed(Box::new(e)))
        }
        (Params::EC(ec), Algorithm::ES256) => {
            use p256::ecdsa::signature::Verifier;
            let public_key = p256::PublicKey::try_from(ec)?;
            let verifying_key = p256::ecdsa::VerifyingKey::from(public_key);
            let signature = p256::ecdsa::Signature::try_from(signature)
                .map_err(|e| Error::SigningFailed(Box::new(e)))?;
            verifying_key
                .verify(data, &signature)
                .map_err(|e| Error::SigningFailed(Box::new(e)))
        }
        _ => Err(Error::SigningFailed(
            "signature algorithm does not match the verification key".into(),
        )),
    }
}
