// Ledger backend: builds Token Metadata instructions, signs them with the
// identity keypair and submits them through a Solana RPC endpoint.

use crate::nft::{
    CollectionMembership, CreateNftInput, Nft, UpdateNftInput, VerifyCollectionInput,
};
use anyhow::{Context, Result};
use mpl_token_metadata::accounts::{MasterEdition, Metadata};
use mpl_token_metadata::instructions::{
    CreateV1Builder, MintV1Builder, UpdateV1Builder, VerifyCollectionV1Builder,
};
use mpl_token_metadata::types::{Collection, CollectionDetails, Data, PrintSupply, TokenStandard};
use solana_client::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;

pub const SPL_TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Token operations the mint flow needs from a ledger.
pub trait Ledger {
    /// Public key of the signing identity.
    fn identity(&self) -> Pubkey;

    fn create(&self, input: &CreateNftInput, commitment: CommitmentConfig) -> Result<Nft>;

    fn verify_collection(&self, input: &VerifyCollectionInput) -> Result<Signature>;

    fn find_by_mint(&self, mint: &Pubkey) -> Result<Nft>;

    fn update(
        &self,
        nft: &Nft,
        input: &UpdateNftInput,
        commitment: CommitmentConfig,
    ) -> Result<Signature>;
}

/// Associated token account of `owner` for `mint`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), SPL_TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

/// Instructions creating a one-of-one token: the metadata and master
/// edition accounts, then a single token minted to the payer.
pub fn create_nft_instructions(
    input: &CreateNftInput,
    mint: &Pubkey,
    payer: &Pubkey,
) -> Vec<Instruction> {
    let metadata = Metadata::find_pda(mint).0;
    let master_edition = MasterEdition::find_pda(mint).0;
    let update_authority = input.update_authority.unwrap_or(*payer);

    let mut create = CreateV1Builder::new();
    create
        .metadata(metadata)
        .master_edition(Some(master_edition))
        .mint(*mint, true)
        .authority(*payer)
        .payer(*payer)
        .update_authority(update_authority, update_authority == *payer)
        .spl_token_program(Some(SPL_TOKEN_PROGRAM_ID))
        .name(input.name.clone())
        .symbol(input.symbol.clone())
        .uri(input.uri.clone())
        .seller_fee_basis_points(input.seller_fee_basis_points)
        .is_mutable(true)
        .token_standard(TokenStandard::NonFungible)
        .print_supply(PrintSupply::Zero);
    if let Some(collection) = input.collection {
        create.collection(Collection {
            verified: false,
            key: collection,
        });
    }
    if input.is_collection {
        create.collection_details(CollectionDetails::V1 { size: 0 });
    }

    let mint_to = MintV1Builder::new()
        .token(associated_token_address(payer, mint))
        .token_owner(Some(*payer))
        .metadata(metadata)
        .master_edition(Some(master_edition))
        .mint(*mint)
        .authority(*payer)
        .payer(*payer)
        .amount(1)
        .instruction();

    vec![create.instruction(), mint_to]
}

pub fn verify_collection_instruction(
    input: &VerifyCollectionInput,
    authority: &Pubkey,
) -> Instruction {
    VerifyCollectionV1Builder::new()
        .authority(*authority)
        .metadata(Metadata::find_pda(&input.mint).0)
        .collection_mint(input.collection_mint)
        .collection_metadata(Some(Metadata::find_pda(&input.collection_mint).0))
        .collection_master_edition(Some(MasterEdition::find_pda(&input.collection_mint).0))
        .instruction()
}

/// Update instruction replacing the token's URI. Name, symbol, fee and
/// creators are carried over from `nft`.
pub fn update_uri_instruction(
    nft: &Nft,
    input: &UpdateNftInput,
    authority: &Pubkey,
) -> Instruction {
    let data = Data {
        name: nft.name.clone(),
        symbol: nft.symbol.clone(),
        uri: input.uri.clone(),
        seller_fee_basis_points: nft.seller_fee_basis_points,
        creators: nft.creators.clone(),
    };
    UpdateV1Builder::new()
        .authority(*authority)
        .mint(nft.address)
        .metadata(nft.metadata_address)
        .edition(Some(MasterEdition::find_pda(&nft.address).0))
        .payer(*authority)
        .data(data)
        .instruction()
}

/// Convert a decoded metadata account into the flow's view of a token.
/// The program pads strings with NUL bytes, which are stripped here.
pub fn nft_from_metadata(metadata_address: Pubkey, metadata: Metadata) -> Nft {
    let trim = |s: String| s.trim_end_matches('\0').to_string();
    Nft {
        address: metadata.mint,
        metadata_address,
        update_authority: metadata.update_authority,
        name: trim(metadata.name),
        symbol: trim(metadata.symbol),
        uri: trim(metadata.uri),
        seller_fee_basis_points: metadata.seller_fee_basis_points,
        creators: metadata.creators,
        collection: metadata.collection.map(|c| CollectionMembership {
            key: c.key,
            verified: c.verified,
        }),
        is_collection: metadata.collection_details.is_some(),
    }
}

/// `Ledger` backed by a Solana RPC endpoint. Every submission is paid for
/// and signed by `payer`.
pub struct SolanaLedger {
    rpc: RpcClient,
    payer: Keypair,
}

impl SolanaLedger {
    pub fn new(rpc: RpcClient, payer: Keypair) -> Self {
        SolanaLedger { rpc, payer }
    }

    /// Sign with `signers` (the payer first), submit, and wait until the
    /// transaction reaches `commitment`.
    fn send(
        &self,
        instructions: &[Instruction],
        signers: &[&Keypair],
        commitment: CommitmentConfig,
    ) -> Result<Signature> {
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .context("Failed to fetch latest blockhash")?;
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer.pubkey()),
            signers,
            blockhash,
        );
        let signature = self
            .rpc
            .send_and_confirm_transaction_with_spinner_and_commitment(&tx, commitment)
            .context("Failed to submit transaction")?;
        Ok(signature)
    }
}

impl Ledger for SolanaLedger {
    fn identity(&self) -> Pubkey {
        self.payer.pubkey()
    }

    fn create(&self, input: &CreateNftInput, commitment: CommitmentConfig) -> Result<Nft> {
        input.validate()?;
        let mint = Keypair::new();
        let payer = self.payer.pubkey();
        let instructions = create_nft_instructions(input, &mint.pubkey(), &payer);
        self.send(&instructions, &[&self.payer, &mint], commitment)
            .with_context(|| format!("Creating token '{}'", input.name))?;

        Ok(Nft {
            address: mint.pubkey(),
            metadata_address: Metadata::find_pda(&mint.pubkey()).0,
            update_authority: input.update_authority.unwrap_or(payer),
            name: input.name.clone(),
            symbol: input.symbol.clone(),
            uri: input.uri.clone(),
            seller_fee_basis_points: input.seller_fee_basis_points,
            creators: None,
            collection: input.collection.map(|key| CollectionMembership {
                key,
                verified: false,
            }),
            is_collection: input.is_collection,
        })
    }

    fn verify_collection(&self, input: &VerifyCollectionInput) -> Result<Signature> {
        let ix = verify_collection_instruction(input, &self.payer.pubkey());
        self.send(&[ix], &[&self.payer], self.rpc.commitment())
            .with_context(|| {
                format!(
                    "Verifying {} as a member of collection {}",
                    input.mint, input.collection_mint
                )
            })
    }

    fn find_by_mint(&self, mint: &Pubkey) -> Result<Nft> {
        let metadata_address = Metadata::find_pda(mint).0;
        let data = self
            .rpc
            .get_account_data(&metadata_address)
            .with_context(|| format!("No metadata account found for mint {}", mint))?;
        let metadata = Metadata::from_bytes(&data)
            .with_context(|| format!("Decoding metadata account {}", metadata_address))?;
        Ok(nft_from_metadata(metadata_address, metadata))
    }

    fn update(
        &self,
        nft: &Nft,
        input: &UpdateNftInput,
        commitment: CommitmentConfig,
    ) -> Result<Signature> {
        input.validate()?;
        let ix = update_uri_instruction(nft, input, &self.payer.pubkey());
        self.send(&[ix], &[&self.payer], commitment)
            .with_context(|| format!("Updating token {}", nft.address))
    }
}
