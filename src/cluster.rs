// Cluster selection: which public Solana network the program talks to and
// how to build Solana Explorer links for it.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

const EXPLORER_URL: &str = "https://explorer.solana.com";

/// A public Solana cluster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    /// Public RPC endpoint of the cluster.
    pub fn api_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        }
    }

    /// Whether the cluster runs a faucet that answers airdrop requests.
    pub fn has_faucet(&self) -> bool {
        matches!(self, Cluster::Devnet | Cluster::Testnet)
    }

    /// Explorer page of an account, e.g. a token mint.
    pub fn address_url(&self, address: impl fmt::Display) -> String {
        format!("{}/address/{}?cluster={}", EXPLORER_URL, address, self)
    }

    /// Explorer page of a transaction signature.
    pub fn tx_url(&self, signature: impl fmt::Display) -> String {
        format!("{}/tx/{}?cluster={}", EXPLORER_URL, signature, self)
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cluster {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            other => bail!(
                "Unknown cluster '{}' (expected devnet, testnet or mainnet-beta)",
                other
            ),
        }
    }
}
