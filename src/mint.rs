// Mint flow: the helper routines that upload assets and create, verify and
// update tokens through the `Metaplex` facade, and the run that chains them.
//
// Each helper is a thin request builder. Errors from storage or ledger are
// passed straight up; nothing is retried or rolled back.

use crate::ledger::Ledger;
use crate::metaplex::Metaplex;
use crate::nft::{CreateNftInput, JsonMetadata, Nft, UpdateNftInput, VerifyCollectionInput};
use crate::storage::{Storage, StorageFile};
use crate::ui::with_spinner;
use anyhow::{bail, Context, Result};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::path::{Path, PathBuf};

/// Descriptor of a token to mint. `image_file` is a file name inside the
/// assets directory.
#[derive(Clone, Debug, PartialEq)]
pub struct NftData {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub seller_fee_basis_points: u16,
    pub image_file: String,
}

impl NftData {
    /// The demo token.
    pub fn nova() -> Self {
        NftData {
            name: "Nova".into(),
            symbol: "Nova #1".into(),
            description: "The biggest baddest NFT in town".into(),
            seller_fee_basis_points: 0,
            image_file: "solana.png".into(),
        }
    }

    /// Replacement metadata for updating an existing token.
    pub fn nova_update() -> Self {
        NftData {
            name: "Update".into(),
            symbol: "UPDATE".into(),
            description: "Update Description".into(),
            seller_fee_basis_points: 100,
            image_file: "success.png".into(),
        }
    }
}

/// Descriptor of a collection token.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionNftData {
    pub data: NftData,
    pub is_collection: bool,
    pub collection_authority: Pubkey,
}

impl CollectionNftData {
    pub fn nova_collection(collection_authority: Pubkey) -> Self {
        CollectionNftData {
            data: NftData {
                name: "Nova Collection".into(),
                symbol: "NOV".into(),
                description: "The biggest baddest collection of NFTs on the Solana Blockchain!"
                    .into(),
                seller_fee_basis_points: 100,
                image_file: "success.png".into(),
            },
            is_collection: true,
            collection_authority,
        }
    }
}

/// What `run` needs besides the facade.
#[derive(Clone, Debug, PartialEq)]
pub struct MintSettings {
    pub assets_dir: PathBuf,
    pub collection_mint: Option<Pubkey>,
    pub update_mint: Option<Pubkey>,
}

/// Upload the descriptor's image and then its JSON metadata. Returns the
/// metadata URI.
///
/// The image is read from disk before anything is sent, so a missing file
/// fails without touching the network.
pub fn upload_metadata<S: Storage, L: Ledger>(
    metaplex: &Metaplex<S, L>,
    nft_data: &NftData,
    assets_dir: &Path,
) -> Result<String> {
    let file = StorageFile::read(&assets_dir.join(&nft_data.image_file))?;

    let image_uri = with_spinner("Uploading image...", || metaplex.storage().upload(&file))?;
    println!("image uri: {}", image_uri);

    let metadata = JsonMetadata::for_image(
        &nft_data.name,
        &nft_data.symbol,
        &nft_data.description,
        &image_uri,
        file.content_type,
    );
    let uri = with_spinner("Uploading metadata...", || metaplex.upload_metadata(&metadata))?;
    println!("Metadata URI : {}", uri);
    Ok(uri)
}

/// Create a token pointing at `uri` and verify it as a member of
/// `collection_mint`. A failed verification leaves the created token in
/// place.
pub fn create_nft<S: Storage, L: Ledger>(
    metaplex: &Metaplex<S, L>,
    uri: &str,
    nft_data: &NftData,
    collection_mint: &Pubkey,
) -> Result<Nft> {
    let input = CreateNftInput {
        uri: uri.to_string(),
        name: nft_data.name.clone(),
        symbol: nft_data.symbol.clone(),
        seller_fee_basis_points: nft_data.seller_fee_basis_points,
        is_collection: false,
        collection: Some(*collection_mint),
        update_authority: None,
    };
    let nft = metaplex.nfts().create(&input, CommitmentConfig::finalized())?;
    println!("Token Mint: {}", metaplex.cluster().address_url(nft.address));

    metaplex
        .nfts()
        .verify_collection(&VerifyCollectionInput {
            mint: nft.address,
            collection_mint: *collection_mint,
            is_sized_collection: true,
        })
        .with_context(|| format!("Token {} was created but not verified", nft.address))?;

    Ok(nft)
}

/// Create a collection token. Collections are not verified against
/// anything.
pub fn create_collection_nft<S: Storage, L: Ledger>(
    metaplex: &Metaplex<S, L>,
    uri: &str,
    data: &CollectionNftData,
) -> Result<Nft> {
    if !data.is_collection {
        bail!("'{}' is not marked as a collection", data.data.name);
    }
    let input = CreateNftInput {
        uri: uri.to_string(),
        name: data.data.name.clone(),
        symbol: data.data.symbol.clone(),
        seller_fee_basis_points: data.data.seller_fee_basis_points,
        is_collection: true,
        collection: None,
        update_authority: Some(data.collection_authority),
    };
    let nft = metaplex.nfts().create(&input, CommitmentConfig::finalized())?;
    println!("Collection Mint: {}", metaplex.cluster().address_url(nft.address));
    Ok(nft)
}

/// Point an existing token at a new metadata URI.
pub fn update_nft_uri<S: Storage, L: Ledger>(
    metaplex: &Metaplex<S, L>,
    uri: &str,
    mint_address: &Pubkey,
) -> Result<Signature> {
    let nft = metaplex.nfts().find_by_mint(mint_address)?;

    let signature = metaplex.nfts().update(
        &nft,
        &UpdateNftInput {
            uri: uri.to_string(),
        },
        CommitmentConfig::finalized(),
    )?;

    println!("Token Mint: {}", metaplex.cluster().address_url(nft.address));
    println!("Transaction: {}", metaplex.cluster().tx_url(signature));
    Ok(signature)
}

/// The whole demo: make sure a collection exists, mint the Nova token into
/// it, optionally update a token, and report the identity.
pub fn run<S: Storage, L: Ledger>(
    metaplex: &Metaplex<S, L>,
    settings: &MintSettings,
) -> Result<Pubkey> {
    let user = metaplex.identity();

    let collection_mint = match settings.collection_mint {
        Some(mint) => mint,
        None => {
            let collection_data = CollectionNftData::nova_collection(user);
            let collection_uri =
                upload_metadata(metaplex, &collection_data.data, &settings.assets_dir)?;
            create_collection_nft(metaplex, &collection_uri, &collection_data)?.address
        }
    };

    let nft_data = NftData::nova();
    let uri = upload_metadata(metaplex, &nft_data, &settings.assets_dir)?;
    create_nft(metaplex, &uri, &nft_data, &collection_mint)?;

    if let Some(mint) = settings.update_mint {
        let update_uri = upload_metadata(metaplex, &NftData::nova_update(), &settings.assets_dir)?;
        update_nft_uri(metaplex, &update_uri, &mint)?;
    }

    println!("PublicKey: {}", user);
    Ok(user)
}

/// Process exit status for the outcome of a run.
pub fn exit_status<T>(result: &Result<T>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
