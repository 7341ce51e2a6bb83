// Entrypoint for the minting demo.
// - Builds the configuration, the identity and the two backends, then hands
//   them to `mint::run`.
// - Any error is printed with its context chain and turns into exit code 1.

use nova_mint::config::Config;
use nova_mint::identity::initialize_keypair;
use nova_mint::ledger::SolanaLedger;
use nova_mint::metaplex::Metaplex;
use nova_mint::mint::{exit_status, run};
use nova_mint::storage::PinataStorage;
use solana_client::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::process::ExitCode;

fn try_main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let rpc =
        RpcClient::new_with_commitment(config.rpc_url.clone(), CommitmentConfig::confirmed());
    let user = initialize_keypair(&rpc, config.cluster, &config.keypair_path)?;

    let storage = PinataStorage::new(&config.storage)?;
    let metaplex = Metaplex::make(storage, SolanaLedger::new(rpc, user), config.cluster);

    run(&metaplex, &config.mint_settings())?;
    Ok(())
}

fn main() -> ExitCode {
    let result = try_main();
    match &result {
        Ok(()) => println!("Finished successfully"),
        Err(e) => println!("{:?}", e),
    }
    ExitCode::from(exit_status(&result))
}
