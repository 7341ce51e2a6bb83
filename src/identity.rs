// Signing identity: a keypair kept in a local JSON file, generated on the
// first run and topped up from the cluster faucet when it runs dry.

use crate::cluster::Cluster;
use crate::ui::with_spinner;
use anyhow::{anyhow, Context, Result};
use solana_client::rpc_client::RpcClient;
use solana_sdk::native_token::{lamports_to_sol, LAMPORTS_PER_SOL};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, write_keypair_file, Keypair, Signer};
use std::path::Path;

/// Airdrop when the balance drops below this.
pub const MIN_BALANCE: u64 = LAMPORTS_PER_SOL;
pub const AIRDROP_AMOUNT: u64 = LAMPORTS_PER_SOL;

/// Load the keypair stored at `path`, or generate one and store it there.
/// The flag is true when a new keypair was written.
pub fn load_or_create_keypair(path: &Path) -> Result<(Keypair, bool)> {
    if path.exists() {
        let keypair = read_keypair_file(path)
            .map_err(|e| anyhow!("Failed to read keypair file {}: {}", path.display(), e))?;
        return Ok((keypair, false));
    }

    let keypair = Keypair::new();
    write_keypair_file(&keypair, path)
        .map_err(|e| anyhow!("Failed to write keypair file {}: {}", path.display(), e))?;
    Ok((keypair, true))
}

/// Whether a balance should be topped up. Only clusters with a faucet
/// can airdrop; elsewhere the identity has to be funded by hand.
pub fn needs_airdrop(cluster: Cluster, balance: u64, min_lamports: u64) -> bool {
    cluster.has_faucet() && balance < min_lamports
}

/// Request an airdrop and wait for it when `pubkey` holds less than
/// `min_lamports` on a cluster with a faucet. Returns the balance
/// afterwards.
pub fn ensure_funded(
    rpc: &RpcClient,
    cluster: Cluster,
    pubkey: &Pubkey,
    min_lamports: u64,
) -> Result<u64> {
    let balance = rpc
        .get_balance(pubkey)
        .with_context(|| format!("Failed to fetch balance of {}", pubkey))?;
    if !needs_airdrop(cluster, balance, min_lamports) {
        return Ok(balance);
    }

    let msg = format!("Airdropping {} SOL...", lamports_to_sol(AIRDROP_AMOUNT));
    with_spinner(&msg, || -> Result<()> {
        let signature = rpc
            .request_airdrop(pubkey, AIRDROP_AMOUNT)
            .context("Airdrop request failed")?;
        rpc.poll_for_signature(&signature)
            .context("Airdrop was not confirmed")?;
        Ok(())
    })?;

    let balance = rpc
        .get_balance(pubkey)
        .with_context(|| format!("Failed to fetch balance of {}", pubkey))?;
    println!("New balance is {} SOL", lamports_to_sol(balance));
    Ok(balance)
}

/// Load or create the identity at `path` and make sure it can pay fees.
pub fn initialize_keypair(rpc: &RpcClient, cluster: Cluster, path: &Path) -> Result<Keypair> {
    let (keypair, created) = load_or_create_keypair(path)?;
    if created {
        println!("Generated new keypair at {}", path.display());
    }
    println!("Identity: {}", keypair.pubkey());
    ensure_funded(rpc, cluster, &keypair.pubkey(), MIN_BALANCE)?;
    Ok(keypair)
}
