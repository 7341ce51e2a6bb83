// Runtime configuration. Every setting is read from an environment variable
// and falls back to a default suited to the devnet demo, so the program runs
// without flags.

use crate::cluster::Cluster;
use crate::mint::MintSettings;
use anyhow::{Context, Result};
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_UPLOAD_URL: &str = "https://uploads.pinata.cloud/v3/files";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud";
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const DEFAULT_ASSETS_DIR: &str = "assets";
const KEYPAIR_FILE_NAME: &str = ".nova_mint_keypair.json";

/// Settings of the storage backend (a Pinata-compatible pinning service).
#[derive(Clone, Debug, PartialEq)]
pub struct StorageConfig {
    pub upload_url: String,
    pub gateway_url: String,
    pub jwt: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub cluster: Cluster,
    pub rpc_url: String,
    pub keypair_path: PathBuf,
    pub assets_dir: PathBuf,
    /// Existing collection to verify new tokens against. When unset, the
    /// run creates a fresh collection first.
    pub collection_mint: Option<Pubkey>,
    /// Token whose metadata URI should be replaced at the end of the run.
    pub update_mint: Option<Pubkey>,
    pub storage: StorageConfig,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cluster = match get("SOLANA_CLUSTER") {
            Some(v) => v.parse::<Cluster>().context("Invalid SOLANA_CLUSTER")?,
            None => Cluster::default(),
        };
        let rpc_url = get("SOLANA_RPC_URL").unwrap_or_else(|| cluster.api_url().to_string());

        let keypair_path = get("NOVA_KEYPAIR_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_keypair_path);
        let assets_dir = get("NOVA_ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));

        let collection_mint = get("NOVA_COLLECTION_MINT")
            .map(|v| parse_pubkey("NOVA_COLLECTION_MINT", &v))
            .transpose()?;
        let update_mint = get("NOVA_UPDATE_MINT")
            .map(|v| parse_pubkey("NOVA_UPDATE_MINT", &v))
            .transpose()?;

        let jwt = get("PINATA_JWT").context("PINATA_JWT must be set to upload files to IPFS")?;
        let timeout = match get("UPLOAD_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(
                v.trim()
                    .parse()
                    .with_context(|| format!("Invalid UPLOAD_TIMEOUT_MS '{}'", v))?,
            ),
            None => DEFAULT_UPLOAD_TIMEOUT,
        };
        let storage = StorageConfig {
            upload_url: get("PINATA_UPLOAD_URL").unwrap_or_else(|| DEFAULT_UPLOAD_URL.into()),
            gateway_url: get("IPFS_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.into()),
            jwt,
            timeout,
        };

        Ok(Config {
            cluster,
            rpc_url,
            keypair_path,
            assets_dir,
            collection_mint,
            update_mint,
            storage,
        })
    }

    /// The part of the configuration the mint flow itself needs.
    pub fn mint_settings(&self) -> MintSettings {
        MintSettings {
            assets_dir: self.assets_dir.clone(),
            collection_mint: self.collection_mint,
            update_mint: self.update_mint,
        }
    }
}

/// Keypair file in the user's home directory (or the working directory
/// when no home is known).
fn default_keypair_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(KEYPAIR_FILE_NAME)
}

fn parse_pubkey(key: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value.trim()).with_context(|| format!("Invalid {} '{}'", key, value))
}
