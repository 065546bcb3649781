//! Per-operation option records.
//!
//! Each operation has a closed set of options; fields are public so
//! callers may fill the record directly, and the `with_` methods chain
//! for the common cases.

use crate::doc::{PublicKey, Service};
use crate::jwk::JWK;

/// Options for creating a DID.
#[derive(Default, Clone)]
pub struct CreateOptions {
    /// Explicit sidetree endpoints, bypassing discovery.
    pub sidetree_endpoints: Vec<String>,
    /// Keys to place in the new document.
    pub public_keys: Vec<PublicKey>,
    /// Services to place in the new document.
    pub services: Vec<Service>,
    /// Public key whose commitment authorizes the first update.
    pub update_public_key: Option<JWK>,
    /// Public key whose commitment authorizes the first recover or
    /// deactivate.
    pub recovery_public_key: Option<JWK>,
}

impl CreateOptions {
    pub fn with_sidetree_endpoint(mut self, url: impl Into<String>) -> Self {
        self.sidetree_endpoints.push(url.into());
        self
    }

    pub fn with_public_key(mut self, key: PublicKey) -> Self {
        self.public_keys.push(key);
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_update_public_key(mut self, key: JWK) -> Self {
        self.update_public_key = Some(key);
        self
    }

    pub fn with_recovery_public_key(mut self, key: JWK) -> Self {
        self.recovery_public_key = Some(key);
        self
    }
}

/// Options for updating a DID document.
#[derive(Default, Clone)]
pub struct UpdateOptions {
    pub sidetree_endpoints: Vec<String>,
    pub add_public_keys: Vec<PublicKey>,
    pub add_services: Vec<Service>,
    pub remove_public_key_ids: Vec<String>,
    pub remove_service_ids: Vec<String>,
    /// Current update private key.
    pub signing_key: Option<JWK>,
    pub signing_key_id: Option<String>,
    /// Public key whose commitment authorizes the next update.
    pub next_update_public_key: Option<JWK>,
}

impl UpdateOptions {
    pub fn with_sidetree_endpoint(mut self, url: impl Into<String>) -> Self {
        self.sidetree_endpoints.push(url.into());
        self
    }

    pub fn with_add_public_key(mut self, key: PublicKey) -> Self {
        self.add_public_keys.push(key);
        self
    }

    pub fn with_add_service(mut self, service: Service) -> Self {
        self.add_services.push(service);
        self
    }

    pub fn with_remove_public_key(mut self, id: impl Into<String>) -> Self {
        self.remove_public_key_ids.push(id.into());
        self
    }

    pub fn with_remove_service(mut self, id: impl Into<String>) -> Self {
        self.remove_service_ids.push(id.into());
        self
    }

    pub fn with_signing_key(mut self, key: JWK) -> Self {
        self.signing_key = Some(key);
        self
    }

    pub fn with_signing_key_id(mut self, id: impl Into<String>) -> Self {
        self.signing_key_id = Some(id.into());
        self
    }

    pub fn with_next_update_public_key(mut self, key: JWK) -> Self {
        self.next_update_public_key = Some(key);
        self
    }
}

/// Options for recovering a DID.
#[derive(Default, Clone)]
pub struct RecoverOptions {
    pub sidetree_endpoints: Vec<String>,
    /// Keys the replacement document will carry.
    pub public_keys: Vec<PublicKey>,
    /// Services the replacement document will carry.
    pub services: Vec<Service>,
    /// Current recovery private key.
    pub signing_key: Option<JWK>,
    pub signing_key_id: Option<String>,
    pub next_update_public_key: Option<JWK>,
    pub next_recovery_public_key: Option<JWK>,
}

impl RecoverOptions {
    pub fn with_sidetree_endpoint(mut self, url: impl Into<String>) -> Self {
        self.sidetree_endpoints.push(url.into());
        self
    }

    pub fn with_public_key(mut self, key: PublicKey) -> Self {
        self.public_keys.push(key);
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_signing_key(mut self, key: JWK) -> Self {
        self.signing_key = Some(key);
        self
    }

    pub fn with_signing_key_id(mut self, id: impl Into<String>) -> Self {
        self.signing_key_id = Some(id.into());
        self
    }

    pub fn with_next_update_public_key(mut self, key: JWK) -> Self {
        self.next_update_public_key = Some(key);
        self
    }

    pub fn with_next_recovery_public_key(mut self, key: JWK) -> Self {
        self.next_recovery_public_key = Some(key);
        self
    }
}

/// Options for deactivating a DID.
#[derive(Default, Clone)]
pub struct DeactivateOptions {
    pub sidetree_endpoints: Vec<String>,
    /// Current recovery private key.
    pub signing_key: Option<JWK>,
    pub signing_key_id: Option<String>,
}

impl DeactivateOptions {
    pub fn with_sidetree_endpoint(mut self, url: impl Into<String>) -> Self {
        self.sidetree_endpoints.push(url.into());
        self
    }

    pub fn with_signing_key(mut self, key: JWK) -> Self {
        self.signing_key = Some(key);
        self
    }

    pub fn with_signing_key_id(mut self, id: impl Into<String>) -> Self {
        self.signing_key_id = Some(id.into());
        self
    }
}
