// Request and response records exchanged with the storage and ledger
// backends. None of them outlive a single call of the mint flow.

use anyhow::{bail, Result};
use mpl_token_metadata::types::Creator;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

pub const MAX_NAME_LENGTH: usize = mpl_token_metadata::MAX_NAME_LENGTH;
pub const MAX_SYMBOL_LENGTH: usize = mpl_token_metadata::MAX_SYMBOL_LENGTH;
pub const MAX_URI_LENGTH: usize = mpl_token_metadata::MAX_URI_LENGTH;
pub const MAX_SELLER_FEE_BASIS_POINTS: u16 = 10_000;

/// Off-chain JSON document describing a token, as uploaded to storage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<JsonProperties>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonProperties {
    pub category: String,
    pub files: Vec<JsonFile>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonFile {
    pub uri: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl JsonMetadata {
    /// Metadata for a single-image token, listing the image under
    /// `properties.files` the way wallets and marketplaces expect.
    pub fn for_image(
        name: &str,
        symbol: &str,
        description: &str,
        image_uri: &str,
        content_type: &str,
    ) -> Self {
        JsonMetadata {
            name: name.to_string(),
            symbol: symbol.to_string(),
            description: description.to_string(),
            image: image_uri.to_string(),
            properties: Some(JsonProperties {
                category: "image".into(),
                files: vec![JsonFile {
                    uri: image_uri.to_string(),
                    content_type: content_type.to_string(),
                }],
            }),
        }
    }
}

/// Arguments of a "create token" submission.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateNftInput {
    pub uri: String,
    pub name: String,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub is_collection: bool,
    /// Collection the token claims membership of. Membership starts out
    /// unverified.
    pub collection: Option<Pubkey>,
    /// Defaults to the ledger identity.
    pub update_authority: Option<Pubkey>,
}

impl CreateNftInput {
    /// Check the on-chain field limits of the Token Metadata program.
    pub fn validate(&self) -> Result<()> {
        if self.name.len() > MAX_NAME_LENGTH {
            bail!("Name '{}' is longer than {} bytes", self.name, MAX_NAME_LENGTH);
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            bail!("Symbol '{}' is longer than {} bytes", self.symbol, MAX_SYMBOL_LENGTH);
        }
        validate_uri(&self.uri)?;
        if self.seller_fee_basis_points > MAX_SELLER_FEE_BASIS_POINTS {
            bail!(
                "Seller fee of {} basis points exceeds {}",
                self.seller_fee_basis_points,
                MAX_SELLER_FEE_BASIS_POINTS
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyCollectionInput {
    pub mint: Pubkey,
    pub collection_mint: Pubkey,
    /// Informational for the Solana backend: `VerifyCollectionV1` handles
    /// sized and unsized collections alike and does not take this flag.
    pub is_sized_collection: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateNftInput {
    pub uri: String,
}

impl UpdateNftInput {
    pub fn validate(&self) -> Result<()> {
        validate_uri(&self.uri)
    }
}

fn validate_uri(uri: &str) -> Result<()> {
    if uri.len() > MAX_URI_LENGTH {
        bail!("URI '{}' is longer than {} bytes", uri, MAX_URI_LENGTH);
    }
    Ok(())
}

/// Collection membership recorded in a token's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionMembership {
    pub key: Pubkey,
    pub verified: bool,
}

/// A token as the ledger reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct Nft {
    /// Mint address; this is the token address shown in explorers.
    pub address: Pubkey,
    pub metadata_address: Pubkey,
    pub update_authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<CollectionMembership>,
    pub is_collection: bool,
}
