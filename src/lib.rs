// Library root
// -----------
// This crate mints demo NFTs on a Solana cluster. The binary (`main.rs`)
// wires the real backends together and runs the flow in `mint`.
//
// Module responsibilities:
// - `config`: Environment-driven settings (cluster, keypair file, storage).
// - `cluster`: Public cluster endpoints and Solana Explorer links.
// - `identity`: Load-or-create the signing keypair and keep it funded.
// - `storage`: Upload files and metadata to IPFS through a pinning service.
// - `ledger`: Build, sign and submit Token Metadata instructions.
// - `metaplex`: Facade bundling a storage and a ledger backend.
// - `nft`: Request and response records shared by the backends.
// - `mint`: The upload/create/verify/update helpers and the main flow.
// - `ui`: Spinners shown while waiting on the network.
//
// The flow only depends on the `Storage` and `Ledger` traits, so it can be
// exercised against in-memory backends in tests.
pub mod cluster;
pub mod config;
pub mod identity;
pub mod ledger;
pub mod metaplex;
pub mod mint;
pub mod nft;
pub mod storage;
pub mod ui;
