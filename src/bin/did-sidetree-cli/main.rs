//! Command-line driver for sidetree DID operations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use did_sidetree::doc::{KeyType, PublicKey, PublicKeyEncoding, Purpose, Service};
use did_sidetree::jwk::JWK;
use did_sidetree::options::{CreateOptions, DeactivateOptions, RecoverOptions, UpdateOptions};
use did_sidetree::{Client, TlsConfig};

#[derive(Parser, Debug)]
#[command(name = "did-sidetree-cli", version, about = "Create, update, recover, and deactivate sidetree-anchored DIDs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new DID
    CreateDid(CreateDidArgs),
    /// Update the document of an existing DID
    UpdateDid(UpdateDidArgs),
    /// Recover an existing DID, replacing its document
    RecoverDid(RecoverDidArgs),
    /// Deactivate an existing DID
    DeactivateDid(DeactivateDidArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// URL of the consortium domain to discover endpoints from
    #[arg(long, default_value = "")]
    domain: String,
    /// Explicit sidetree endpoint, bypassing discovery (repeatable)
    #[arg(long = "sidetree-url")]
    sidetree_url: Vec<String>,
    /// Bearer token for writes to the sidetree nodes
    #[arg(long = "sidetree-write-token")]
    sidetree_write_token: Option<String>,
    /// Extra CA certificate PEM file to trust (repeatable)
    #[arg(long = "tls-cacerts")]
    tls_cacerts: Vec<PathBuf>,
    /// Trust the system certificate pool
    #[arg(long = "tls-systemcertpool", default_value_t = false)]
    tls_systemcertpool: bool,
}

#[derive(Args, Debug)]
struct CreateDidArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// JWK file with the public key committed for the first update
    #[arg(long = "updatekey-file")]
    updatekey_file: PathBuf,
    /// JWK file with the public key committed for the first recovery
    #[arg(long = "recoverykey-file")]
    recoverykey_file: PathBuf,
    /// JSON file describing the public keys of the new document
    #[arg(long = "publickey-file")]
    publickey_file: Option<PathBuf>,
    /// JSON file describing the services of the new document
    #[arg(long = "service-file")]
    service_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UpdateDidArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// DID URI to update
    #[arg(long = "did-uri")]
    did_uri: String,
    /// JWK file with the current update private key
    #[arg(long = "signingkey-file")]
    signingkey_file: PathBuf,
    /// Key id placed in the signature header
    #[arg(long = "signingkey-id")]
    signingkey_id: Option<String>,
    /// JWK file with the public key committed for the next update
    #[arg(long = "nextupdatekey-file")]
    nextupdatekey_file: PathBuf,
    /// JSON file describing public keys to add
    #[arg(long = "add-publickey-file")]
    add_publickey_file: Option<PathBuf>,
    /// JSON file describing services to add
    #[arg(long = "add-service-file")]
    add_service_file: Option<PathBuf>,
    /// Id of a public key to remove (repeatable)
    #[arg(long = "remove-publickey-id")]
    remove_publickey_id: Vec<String>,
    /// Id of a service to remove (repeatable)
    #[arg(long = "remove-service-id")]
    remove_service_id: Vec<String>,
}

#[derive(Args, Debug)]
struct RecoverDidArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// DID URI to recover
    #[arg(long = "did-uri")]
    did_uri: String,
    /// JWK file with the current recovery private key
    #[arg(long = "signingkey-file")]
    signingkey_file: PathBuf,
    /// Key id placed in the signature header
    #[arg(long = "signingkey-id")]
    signingkey_id: Option<String>,
    /// JWK file with the public key committed for the next update
    #[arg(long = "nextupdatekey-file")]
    nextupdatekey_file: PathBuf,
    /// JWK file with the public key committed for the next recovery
    #[arg(long = "nextrecoverykey-file")]
    nextrecoverykey_file: PathBuf,
    /// JSON file describing the public keys of the replacement document
    #[arg(long = "publickey-file")]
    publickey_file: Option<PathBuf>,
    /// JSON file describing the services of the replacement document
    #[arg(long = "service-file")]
    service_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DeactivateDidArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// DID URI to deactivate
    #[arg(long = "did-uri")]
    did_uri: String,
    /// JWK file with the current recovery private key
    #[arg(long = "signingkey-file")]
    signingkey_file: PathBuf,
    /// Key id placed in the signature header
    #[arg(long = "signingkey-id")]
    signingkey_id: Option<String>,
}

/// One entry of a --publickey-file / --add-publickey-file document.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PublicKeyFileEntry {
    id: String,
    #[serde(rename = "type")]
    key_type: KeyType,
    #[serde(default)]
    purposes: Vec<Purpose>,
    /// Path to a JWK file holding the key material.
    jwk_path: PathBuf,
}

fn load_jwk(path: &Path) -> anyhow::Result<JWK> {
    let bytes = fs::read(path).with_context(|| format!("read key file {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse JWK file {}", path.display()))
}

fn load_public_keys(path: &Path) -> anyhow::Result<Vec<PublicKey>> {
    let bytes =
        fs::read(path).with_context(|| format!("read public key file {}", path.display()))?;
    let entries: Vec<PublicKeyFileEntry> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse public key file {}", path.display()))?;
    entries
        .into_iter()
        .map(|entry| {
            let value = fs::read(&entry.jwk_path)
                .with_context(|| format!("read JWK file {}", entry.jwk_path.display()))?;
            Ok(PublicKey {
                id: entry.id,
                key_type: entry.key_type,
                encoding: PublicKeyEncoding::Jwk,
                purposes: entry.purposes,
                value,
            })
        })
        .collect()
}

fn load_services(path: &Path) -> anyhow::Result<Vec<Service>> {
    let bytes = fs::read(path).with_context(|| format!("read service file {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse service file {}", path.display()))
}

fn build_client(common: &CommonArgs) -> anyhow::Result<Client> {
    let mut tls = TlsConfig {
        root_certificates: Vec::new(),
        use_system_roots: common.tls_systemcertpool,
    };
    for path in &common.tls_cacerts {
        let pem =
            fs::read(path).with_context(|| format!("read CA certificate {}", path.display()))?;
        tls.root_certificates.push(
            reqwest::Certificate::from_pem(&pem)
                .with_context(|| format!("parse CA certificate {}", path.display()))?,
        );
    }
    let mut builder = Client::builder().tls(tls);
    if let Some(token) = &common.sidetree_write_token {
        builder = builder.auth_token(token);
    }
    Ok(builder.build()?)
}

async fn run_create(args: CreateDidArgs) -> anyhow::Result<()> {
    let client = build_client(&args.common)?;
    let mut opts = CreateOptions::default()
        .with_update_public_key(load_jwk(&args.updatekey_file)?)
        .with_recovery_public_key(load_jwk(&args.recoverykey_file)?);
    opts.sidetree_endpoints = args.common.sidetree_url.clone();
    if let Some(path) = &args.publickey_file {
        opts.public_keys = load_public_keys(path)?;
    }
    if let Some(path) = &args.service_file {
        opts.services = load_services(path)?;
    }
    let document = client.create_did(&args.common.domain, opts).await?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

async fn run_update(args: UpdateDidArgs) -> anyhow::Result<()> {
    let client = build_client(&args.common)?;
    let mut opts = UpdateOptions::default()
        .with_signing_key(load_jwk(&args.signingkey_file)?)
        .with_next_update_public_key(load_jwk(&args.nextupdatekey_file)?);
    opts.sidetree_endpoints = args.common.sidetree_url.clone();
    opts.signing_key_id = args.signingkey_id.clone();
    opts.remove_public_key_ids = args.remove_publickey_id.clone();
    opts.remove_service_ids = args.remove_service_id.clone();
    if let Some(path) = &args.add_publickey_file {
        opts.add_public_keys = load_public_keys(path)?;
    }
    if let Some(path) = &args.add_service_file {
        opts.add_services = load_services(path)?;
    }
    client
        .update_did(&args.did_uri, &args.common.domain, opts)
        .await?;
    println!("successfully updated DID {}", args.did_uri);
    Ok(())
}

async fn run_recover(args: RecoverDidArgs) -> anyhow::Result<()> {
    let client = build_client(&args.common)?;
    let mut opts = RecoverOptions::default()
        .with_signing_key(load_jwk(&args.signingkey_file)?)
        .with_next_update_public_key(load_jwk(&args.nextupdatekey_file)?)
        .with_next_recovery_public_key(load_jwk(&args.nextrecoverykey_file)?);
    opts.sidetree_endpoints = args.common.sidetree_url.clone();
    opts.signing_key_id = args.signingkey_id.clone();
    if let Some(path) = &args.publickey_file {
        opts.public_keys = load_public_keys(path)?;
    }
    if let Some(path) = &args.service_file {
        opts.services = load_services(path)?;
    }
    match client
        .recover_did(&args.did_uri, &args.common.domain, opts)
        .await?
    {
        Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
        None => println!("successfully recovered DID {}", args.did_uri),
    }
    Ok(())
}

async fn run_deactivate(args: DeactivateDidArgs) -> anyhow::Result<()> {
    let client = build_client(&args.common)?;
    let mut opts = DeactivateOptions::default().with_signing_key(load_jwk(&args.signingkey_file)?);
    opts.sidetree_endpoints = args.common.sidetree_url.clone();
    opts.signing_key_id = args.signingkey_id.clone();
    client
        .deactivate_did(&args.did_uri, &args.common.domain, opts)
        .await?;
    println!("successfully deactivated DID {}", args.did_uri);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::CreateDid(args) => run_create(args).await,
        Command::UpdateDid(args) => run_update(args).await,
        Command::RecoverDid(args) => run_recover(args).await,
        Command::DeactivateDid(args) => run_deactivate(args).await,
    }
}
