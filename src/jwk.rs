//! JSON Web Key model and key classification.
//!
//! The method accepts exactly two key algorithms: Ed25519 (OKP) and NIST
//! P-256 (EC). Symmetric (`oct`) keys decode but never classify; they are
//! rejected with a key-not-supported error.

// RFC 7517 - JSON Web Key (JWK)
// RFC 7518 - JSON Web Algorithms (JWA)
// RFC 8037 - CFRG ECDH and Signatures in JOSE

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use zeroize::Zeroize;

use crate::error::Error;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq)]
pub struct JWK {
    #[serde(rename = "alg")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(flatten)]
    pub params: Params,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
#[serde(tag = "kty")]
pub enum Params {
    EC(ECParams),
    OKP(OctetParams),
    #[serde(rename = "oct")]
    Symmetric(SymmetricParams),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
pub struct ECParams {
    // Parameters for Elliptic Curve Public Keys
    #[serde(rename = "crv")]
    pub curve: Option<String>,
    #[serde(rename = "x")]
    pub x_coordinate: Option<Base64urlUInt>,
    #[serde(rename = "y")]
    pub y_coordinate: Option<Base64urlUInt>,

    // Parameters for Elliptic Curve Private Keys
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecc_private_key: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
pub struct OctetParams {
    // Parameters for Octet Key Pair Public Keys
    #[serde(rename = "crv")]
    pub curve: String,
    #[serde(rename = "x")]
    pub public_key: Base64urlUInt,

    // Parameters for Octet Key Pair Private Keys
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
pub struct SymmetricParams {
    #[serde(rename = "k")]
    pub key_value: Option<Base64urlUInt>,
}

impl Drop for ECParams {
    fn drop(&mut self) {
        // Zeroize private key
        if let Some(ref mut d) = self.ecc_private_key {
            d.zeroize();
        }
    }
}

impl Drop for OctetParams {
    fn drop(&mut self) {
        // Zeroize private key
        if let Some(ref mut d) = self.private_key {
            d.zeroize();
        }
    }
}

impl Drop for SymmetricParams {
    fn drop(&mut self) {
        // Zeroize symmetric key
        if let Some(ref mut k) = self.key_value {
            k.zeroize();
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
#[serde(try_from = "String")]
#[serde(into = "Base64urlUIntString")]
pub struct Base64urlUInt(pub Vec<u8>);
type Base64urlUIntString = String;

impl TryFrom<String> for Base64urlUInt {
    type Error = base64::DecodeError;
    fn try_from(data: String) -> Result<Self, Self::Error> {
        Ok(Base64urlUInt(base64::decode_config(
            data,
            base64::URL_SAFE_NO_PAD,
        )?))
    }
}

impl From<&Base64urlUInt> for String {
    fn from(data: &Base64urlUInt) -> String {
        base64::encode_config(&data.0, base64::URL_SAFE_NO_PAD)
    }
}

impl From<Base64urlUInt> for Base64urlUIntString {
    fn from(data: Base64urlUInt) -> Base64urlUIntString {
        String::from(&data)
    }
}

/// JWS signature algorithm (`alg` header value).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Hash, Eq)]
pub enum Algorithm {
    EdDSA,
    ES256,
}

/// Classified key algorithm, carried alongside key material so that codec
/// and signer boundaries dispatch on the tag instead of re-inspecting the
/// JWK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Ed25519,
    P256,
}

impl KeyKind {
    /// Signature algorithm implied by the key algorithm.
    pub fn algorithm(self) -> Algorithm {
        match self {
            KeyKind::Ed25519 => Algorithm::EdDSA,
            KeyKind::P256 => Algorithm::ES256,
        }
    }
}

/// Classify a JWK into one of the supported key kinds.
///
/// Anything outside OKP/Ed25519 and EC/P-256 is rejected before it can
/// reach a commitment, signature, or the network.
pub fn classify(key: &JWK) -> Result<KeyKind, Error> {
    match &key.params {
        Params::OKP(okp) if okp.curve == "Ed25519" => Ok(KeyKind::Ed25519),
        Params::OKP(okp) => Err(Error::UnsupportedCurve(okp.curve.clone())),
        Params::EC(ec) => match ec.curve.as_deref() {
            Some("P-256") => Ok(KeyKind::P256),
            Some(curve) => Err(Error::UnsupportedCurve(curve.to_string())),
            None => Err(Error::InvalidKeyMaterial("missing curve in JWK".to_string())),
        },
        Params::Symmetric(_) => Err(Error::UnsupportedKeyType),
    }
}

impl From<Params> for JWK {
    fn from(params: Params) -> Self {
        Self {
            algorithm: None,
            key_id: None,
            params,
        }
    }
}

impl JWK {
    /// Strip private key material.
    pub fn to_public(&self) -> Self {
        let mut key = self.clone();
        key.params = key.params.to_public();
        key
    }
}

impl Params {
    pub fn to_public(&self) -> Self {
        match self {
            Self::EC(params) => Self::EC(ECParams {
                curve: params.curve.clone(),
                x_coordinate: params.x_coordinate.clone(),
                y_coordinate: params.y_coordinate.clone(),
                ecc_private_key: None,
            }),
            Self::OKP(params) => Self::OKP(OctetParams {
                curve: params.curve.clone(),
                public_key: params.public_key.clone(),
                private_key: None,
            }),
            Self::Symmetric(_) => Self::Symmetric(SymmetricParams { key_value: None }),
        }
    }
}

/// Parse a raw 32-byte Ed25519 public key.
pub fn ed25519_parse(data: &[u8]) -> Result<JWK, Error> {
    let _: ed25519_dalek::VerifyingKey = data
        .try_into()
        .map_err(|e: ed25519_dalek::SignatureError| Error::InvalidKeyMaterial(e.to_string()))?;
    Ok(JWK::from(Params::OKP(OctetParams {
        curve: "Ed25519".to_string(),
        public_key: Base64urlUInt(data.to_owned()),
        private_key: None,
    })))
}

/// Parse a raw 32-byte Ed25519 private key (seed).
pub fn ed25519_parse_private(data: &[u8]) -> Result<JWK, Error> {
    let key: ed25519_dalek::SigningKey = data
        .try_into()
        .map_err(|e: ed25519_dalek::SignatureError| Error::InvalidKeyMaterial(e.to_string()))?;
    Ok(JWK::from(Params::OKP(OctetParams {
        curve: "Ed25519".to_string(),
        public_key: Base64urlUInt(ed25519_dalek::VerifyingKey::from(&key).as_bytes().to_vec()),
        private_key: Some(Base64urlUInt(data.to_owned())),
    })))
}

/// Parse a SEC1-encoded P-256 public key (`0x04 || X || Y` uncompressed,
/// or compressed).
pub fn p256_parse(pk_bytes: &[u8]) -> Result<JWK, Error> {
    let pk = p256::PublicKey::from_sec1_bytes(pk_bytes)
        .map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
    Ok(JWK::from(Params::EC(ECParams::try_from(&pk)?)))
}

/// Parse a raw 32-byte P-256 private scalar.
pub fn p256_parse_private(data: &[u8]) -> Result<JWK, Error> {
    if data.len() != 32 {
        return Err(Error::InvalidKeyMaterial(format!(
            "expected 32-byte P-256 private key but found length {}",
            data.len()
        )));
    }
    let sk = p256::SecretKey::from_bytes(data.into())
        .map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
    Ok(JWK::from(Params::EC(ECParams::try_from(&sk)?)))
}

impl TryFrom<&OctetParams> for ed25519_dalek::VerifyingKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        if params.curve != *"Ed25519" {
            return Err(Error::UnsupportedCurve(params.curve.to_string()));
        }
        params
            .public_key
            .0
            .as_slice()
            .try_into()
            .map_err(|e: ed25519_dalek::SignatureError| Error::InvalidKeyMaterial(e.to_string()))
    }
}

impl TryFrom<&OctetParams> for ed25519_dalek::SigningKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        if params.curve != *"Ed25519" {
            return Err(Error::UnsupportedCurve(params.curve.to_string()));
        }
        let private_key = params
            .private_key
            .as_ref()
            .ok_or_else(|| Error::InvalidKeyMaterial("missing private key in JWK".to_string()))?;
        private_key
            .0
            .as_slice()
            .try_into()
            .map_err(|e: ed25519_dalek::SignatureError| Error::InvalidKeyMaterial(e.to_string()))
    }
}

impl TryFrom<&ECParams> for p256::SecretKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        let curve = params
            .curve
            .as_ref()
            .ok_or_else(|| Error::InvalidKeyMaterial("missing curve in JWK".to_string()))?;
        if curve != "P-256" {
            return Err(Error::UnsupportedCurve(curve.to_string()));
        }
        let private_key = params
            .ecc_private_key
            .as_ref()
            .ok_or_else(|| Error::InvalidKeyMaterial("missing private key in JWK".to_string()))?;
        if private_key.0.len() != 32 {
            return Err(Error::InvalidKeyMaterial(format!(
                "expected 32-byte P-256 private key but found length {}",
                private_key.0.len()
            )));
        }
        p256::SecretKey::from_bytes(private_key.0.as_slice().into())
            .map_err(|e| Error::InvalidKeyMaterial(e.to_string()))
    }
}

impl TryFrom<&ECParams> for p256::PublicKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        let curve = params
            .curve
            .as_ref()
            .ok_or_else(|| Error::InvalidKeyMaterial("missing curve in JWK".to_string()))?;
        if curve != "P-256" {
            return Err(Error::UnsupportedCurve(curve.to_string()));
        }
        let x = params
            .x_coordinate
            .as_ref()
            .ok_or_else(|| Error::InvalidKeyMaterial("missing elliptic curve point in JWK".to_string()))?;
        let y = params
            .y_coordinate
            .as_ref()
            .ok_or_else(|| Error::InvalidKeyMaterial("missing elliptic curve point in JWK".to_string()))?;
        if x.0.len() != 32 || y.0.len() != 32 {
            return Err(Error::InvalidKeyMaterial(
                "expected 32-byte P-256 coordinates".to_string(),
            ));
        }
        use p256::elliptic_curve::sec1::FromEncodedPoint;
        let point = p256::EncodedPoint::from_affine_coordinates(
            p256::FieldBytes::from_slice(&x.0),
            p256::FieldBytes::from_slice(&y.0),
            false,
        );
        let pk: Option<p256::PublicKey> =
            p256::PublicKey::from_encoded_point(&point).into();
        pk.ok_or_else(|| Error::InvalidKeyMaterial("point is not on the P-256 curve".to_string()))
    }
}

impl TryFrom<&p256::PublicKey> for ECParams {
    type Error = Error;
    fn try_from(pk: &p256::PublicKey) -> Result<Self, Self::Error> {
        use p256::elliptic_curve::sec1::ToEncodedPoint;
        let encoded_point = pk.to_encoded_point(false);
        let x = encoded_point
            .x()
            .ok_or_else(|| Error::InvalidKeyMaterial("missing elliptic curve point".to_string()))?;
        let y = encoded_point
            .y()
            .ok_or_else(|| Error::InvalidKeyMaterial("missing elliptic curve point".to_string()))?;
        Ok(ECParams {
            curve: Some("P-256".to_string()),
            x_coordinate: Some(Base64urlUInt(x.to_vec())),
            y_coordinate: Some(Base64urlUInt(y.to_vec())),
            ecc_private_key: None,
        })
    }
}

impl TryFrom<&p256::SecretKey> for ECParams {
    type Error = Error;
    fn try_from(sk: &p256::SecretKey) -> Result<Self, Self::Error> {
        let pk = sk.public_key();
        let mut params = ECParams::try_from(&pk)?;
        params.ecc_private_key = Some(Base64urlUInt(sk.to_bytes().to_vec()));
        Ok(params)
    }
}
