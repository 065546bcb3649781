//! Client for the write path of a Sidetree-anchored DID method.
//!
//! The [`client::Client`] builds the four Sidetree operation payloads
//! (create, update, recover, deactivate), maintains the commitment/reveal
//! chain that links consecutive operations, signs operation envelopes with
//! caller-supplied keys, resolves anchor endpoints, and submits the
//! operation request over HTTPS.
//!
//! Reading (DID resolution) is out of scope apart from parsing the
//! document returned by a create request.

pub mod client;
pub mod config;
pub mod doc;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod hashing;
pub mod jwk;
pub mod jws;
pub mod operation;
pub mod options;

pub use client::{Client, ClientBuilder, TlsConfig};
pub use error::Error;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
