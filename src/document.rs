//! DID document model for create responses.
//!
//! The write path only ever reads one document: the one a node returns
//! after anchoring a create operation. Nodes answer either with the bare
//! document or with a DID-resolution envelope around it; both forms are
//! accepted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// A DID document, reduced to the properties this client inspects. All
/// remaining properties are retained verbatim.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(flatten)]
    pub property_set: Map<String, Value>,
}

/// DID-resolution envelope around a document.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResolutionResult {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "didDocument")]
    pub did_document: Document,
    #[serde(flatten)]
    pub property_set: Map<String, Value>,
}

/// Parse the body of a create response.
pub fn from_create_response(body: &[u8]) -> Result<Document, Error> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| Error::ResponseParseFailed(Box::new(e)))?;
    if value.get("didDocument").is_some() {
        let resolution: ResolutionResult =
            serde_json::from_value(value).map_err(|e| Error::ResponseParseFailed(Box::new(e)))?;
        return Ok(resolution.did_document);
    }
    let document: Document =
        serde_json::from_value(value).map_err(|e| Error::ResponseParseFailed(Box::new(e)))?;
    if document.id.is_empty() || document.context.is_none() {
        return Err(Error::ResponseParseFailed(
            "response is not a DID document or DID resolution result".into(),
        ));
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolution_envelope() {
        let body = br#"{"@context":"https://www.w3.org/ns/did-resolution/v1","didDocument":{"id":"did1","@context":["https://www.w3.org/ns/did/v1"]}}"#;
        let document = from_create_response(body).unwrap();
        assert_eq!(document.id, "did1");
    }

    #[test]
    fn parses_bare_document() {
        let body = br#"{"id":"did1","@context":"https://www.w3.org/ns/did/v1","service":[]}"#;
        let document = from_create_response(body).unwrap();
        assert_eq!(document.id, "did1");
        assert!(document.property_set.contains_key("service"));
    }

    #[test]
    fn rejects_document_without_context() {
        let err = from_create_response(br#"{"id":"did1"}"#).unwrap_err();
        assert!(matches!(err, Error::ResponseParseFailed(_)));
    }

    #[test]
    fn rejects_non_json_body() {
        let err = from_create_response(b"not json").unwrap_err();
        assert!(matches!(err, Error::ResponseParseFailed(_)));
    }
}
