//! Canonical JSON and multihash primitives.
//!
//! Every value that is hashed or signed goes through the JSON
//! Canonicalization Scheme (RFC 8785) first, so that two structurally
//! equal values always hash identically. The multihash algorithm code is
//! supplied by the sidetree node's configuration and is never defaulted
//! here.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Error;

/// Multicodec code for SHA2-256, the only digest this client implements.
pub const MULTIHASH_SHA2_256: u64 = 0x12;

/// Canonicalize a value with the JSON Canonicalization Scheme (JCS).
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_jcs::to_string(value).map_err(Error::Canonicalization)
}

/// Hash data into `varint(code) || varint(len) || digest`.
pub fn multihash(code: u64, data: &[u8]) -> Result<Vec<u8>, Error> {
    if code != MULTIHASH_SHA2_256 {
        return Err(Error::SidetreeConfigFailed(
            format!("multihash algorithm code {code} is not supported").into(),
        ));
    }
    let digest = Sha256::digest(data);
    let mut out = Vec::with_capacity(2 + digest.len());
    write_varint(&mut out, code);
    write_varint(&mut out, digest.len() as u64);
    out.extend_from_slice(&digest);
    Ok(out)
}

/// Multihash encoded as base64url without padding, the form commitments
/// and delta hashes take on the wire.
pub fn encoded_multihash(code: u64, data: &[u8]) -> Result<String, Error> {
    let hash = multihash(code, data)?;
    Ok(base64::encode_config(hash, base64::URL_SAFE_NO_PAD))
}

fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn multihash_layout() {
        let hash = multihash(MULTIHASH_SHA2_256, b"data").unwrap();
        assert_eq!(hash.len(), 34);
        assert_eq!(&hash[..2], &[0x12, 0x20]);
        assert_eq!(&hash[2..], Sha256::digest(b"data").as_slice());
    }

    #[test]
    fn multihash_rejects_unknown_code() {
        let err = multihash(0x16, b"data").unwrap_err();
        assert!(matches!(err, Error::SidetreeConfigFailed(_)));
    }

    #[test]
    fn canonicalization_ignores_key_order() {
        let a = json!({"b": 1, "a": {"y": true, "x": "s"}});
        let b = json!({"a": {"x": "s", "y": true}, "b": 1});
        assert_eq!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
        assert_eq!(canonicalize(&a).unwrap(), r#"{"a":{"x":"s","y":true},"b":1}"#);
    }

    #[test]
    fn canonicalization_distinguishes_values() {
        let a = json!({"a": 1});
        let b = json!({"a": 2});
        assert_ne!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
    }
}
