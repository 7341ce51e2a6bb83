// SDK facade: one handle bundling the storage backend, the ledger backend
// and the cluster they belong to. The mint helpers only ever talk to this.

use crate::cluster::Cluster;
use crate::ledger::Ledger;
use crate::nft::JsonMetadata;
use crate::storage::Storage;
use anyhow::Result;
use solana_sdk::pubkey::Pubkey;

pub struct Metaplex<S, L> {
    storage: S,
    ledger: L,
    cluster: Cluster,
}

impl<S: Storage, L: Ledger> Metaplex<S, L> {
    pub fn make(storage: S, ledger: L, cluster: Cluster) -> Self {
        Metaplex {
            storage,
            ledger,
            cluster,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Token operations (create, verify, find, update).
    pub fn nfts(&self) -> &L {
        &self.ledger
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    /// Public key of the identity that signs and pays for submissions.
    pub fn identity(&self) -> Pubkey {
        self.ledger.identity()
    }

    /// Upload an off-chain metadata document and return its URI.
    pub fn upload_metadata(&self, metadata: &JsonMetadata) -> Result<String> {
        self.storage.upload_json(metadata)
    }
}
