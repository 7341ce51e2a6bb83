// Mint flow against in-memory storage and ledger backends that record every
// call they receive.

use anyhow::{bail, Result};
use nova_mint::cluster::Cluster;
use nova_mint::ledger::Ledger;
use nova_mint::metaplex::Metaplex;
use nova_mint::mint::{
    create_collection_nft, create_nft, exit_status, run, update_nft_uri, upload_metadata,
    CollectionNftData, MintSettings, NftData,
};
use nova_mint::nft::{
    CollectionMembership, CreateNftInput, JsonMetadata, Nft, UpdateNftInput, VerifyCollectionInput,
};
use nova_mint::storage::{Storage, StorageFile};
use pretty_assertions::assert_eq;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Upload { file_name: String, buffer: Vec<u8> },
    Create(CreateNftInput, CommitmentConfig),
    Verify(VerifyCollectionInput),
    FindByMint(Pubkey),
    Update { mint: Pubkey, uri: String, commitment: CommitmentConfig },
}

type Log = Rc<RefCell<Vec<Call>>>;

struct StubStorage {
    log: Log,
    uri: String,
    fail: bool,
}

impl Storage for StubStorage {
    fn upload(&self, file: &StorageFile) -> Result<String> {
        self.log.borrow_mut().push(Call::Upload {
            file_name: file.file_name.clone(),
            buffer: file.buffer.clone(),
        });
        if self.fail {
            bail!("storage unavailable");
        }
        Ok(self.uri.clone())
    }
}

#[derive(Default)]
struct Failures {
    create: bool,
    verify: bool,
    find: bool,
    update: bool,
}

struct MockLedger {
    log: Log,
    identity: Pubkey,
    fail: Failures,
}

impl Ledger for MockLedger {
    fn identity(&self) -> Pubkey {
        self.identity
    }

    fn create(&self, input: &CreateNftInput, commitment: CommitmentConfig) -> Result<Nft> {
        self.log
            .borrow_mut()
            .push(Call::Create(input.clone(), commitment));
        if self.fail.create {
            bail!("create rejected");
        }
        Ok(Nft {
            address: Pubkey::new_unique(),
            metadata_address: Pubkey::new_unique(),
            update_authority: input.update_authority.unwrap_or(self.identity),
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
        self.log.borrow_mut().push(Call::Verify(input.clone()));
        if self.fail.verify {
            bail!("verify rejected");
        }
        Ok(Signature::default())
    }

    fn find_by_mint(&self, mint: &Pubkey) -> Result<Nft> {
        self.log.borrow_mut().push(Call::FindByMint(*mint));
        if self.fail.find {
            bail!("lookup rejected");
        }
        Ok(Nft {
            address: *mint,
            metadata_address: Pubkey::new_unique(),
            update_authority: self.identity,
            name: "Nova".into(),
            symbol: "Nova #1".into(),
            uri: "ipfs://old".into(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            is_collection: false,
        })
    }

    fn update(
        &self,
        nft: &Nft,
        input: &UpdateNftInput,
        commitment: CommitmentConfig,
    ) -> Result<Signature> {
        self.log.borrow_mut().push(Call::Update {
            mint: nft.address,
            uri: input.uri.clone(),
            commitment,
        });
        if self.fail.update {
            bail!("update rejected");
        }
        Ok(Signature::default())
    }
}

struct Harness {
    log: Log,
    metaplex: Metaplex<StubStorage, MockLedger>,
}

fn harness(storage_fails: bool, fail: Failures) -> Harness {
    let log: Log = Rc::default();
    let storage = StubStorage {
        log: log.clone(),
        uri: "ipfs://abc".into(),
        fail: storage_fails,
    };
    let ledger = MockLedger {
        log: log.clone(),
        identity: Pubkey::new_unique(),
        fail,
    };
    Harness {
        log,
        metaplex: Metaplex::make(storage, ledger, Cluster::Devnet),
    }
}

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn settings() -> MintSettings {
    MintSettings {
        assets_dir: assets_dir(),
        collection_mint: None,
        update_mint: None,
    }
}

fn calls(log: &Log) -> Vec<Call> {
    log.borrow().clone()
}

fn is_create(call: &Call) -> bool {
    matches!(call, Call::Create(..))
}

#[test]
fn missing_image_fails_before_any_upload() {
    let h = harness(false, Failures::default());
    let data = NftData {
        image_file: "missing.png".into(),
        ..NftData::nova()
    };

    let result = upload_metadata(&h.metaplex, &data, &assets_dir());

    assert!(result.is_err());
    assert!(calls(&h.log).is_empty());
}

#[test]
fn upload_metadata_sends_image_then_json() {
    let h = harness(false, Failures::default());

    let uri = upload_metadata(&h.metaplex, &NftData::nova(), &assets_dir()).unwrap();
    assert_eq!(uri, "ipfs://abc");

    let log = calls(&h.log);
    assert_eq!(log.len(), 2);
    let image = std::fs::read(assets_dir().join("solana.png")).unwrap();
    assert_eq!(
        log[0],
        Call::Upload {
            file_name: "solana.png".into(),
            buffer: image
        }
    );
    match &log[1] {
        Call::Upload { file_name, buffer } => {
            assert_eq!(file_name, "metadata.json");
            let json: JsonMetadata = serde_json::from_slice(buffer).unwrap();
            assert_eq!(json.name, "Nova");
            assert_eq!(json.symbol, "Nova #1");
            assert_eq!(json.description, "The biggest baddest NFT in town");
            assert_eq!(json.image, "ipfs://abc");
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[test]
fn create_nft_creates_once_then_verifies_once() {
    let h = harness(false, Failures::default());
    let collection = Pubkey::new_unique();

    let nft = create_nft(&h.metaplex, "ipfs://abc", &NftData::nova(), &collection).unwrap();

    let log = calls(&h.log);
    assert_eq!(log.len(), 2);
    match &log[0] {
        Call::Create(input, commitment) => {
            assert_eq!(*commitment, CommitmentConfig::finalized());
            assert!(!input.is_collection);
            assert_eq!(input.collection, Some(collection));
        }
        other => panic!("unexpected call {:?}", other),
    }
    assert_eq!(
        log[1],
        Call::Verify(VerifyCollectionInput {
            mint: nft.address,
            collection_mint: collection,
            is_sized_collection: true,
        })
    );
}

#[test]
fn failed_verification_surfaces_after_create() {
    let h = harness(
        false,
        Failures {
            verify: true,
            ..Failures::default()
        },
    );

    let err = create_nft(&h.metaplex, "ipfs://abc", &NftData::nova(), &Pubkey::new_unique())
        .unwrap_err();

    assert!(format!("{:#}", err).contains("was created but not verified"));
    let log = calls(&h.log);
    assert_eq!(log.len(), 2);
    assert!(is_create(&log[0]));
}

#[test]
fn create_collection_sets_flag_and_never_verifies() {
    let h = harness(false, Failures::default());
    let authority = Pubkey::new_unique();
    let data = CollectionNftData::nova_collection(authority);

    let nft = create_collection_nft(&h.metaplex, "ipfs://abc", &data).unwrap();
    assert!(nft.is_collection);

    let log = calls(&h.log);
    assert_eq!(
        log,
        vec![Call::Create(
            CreateNftInput {
                uri: "ipfs://abc".into(),
                name: "Nova Collection".into(),
                symbol: "NOV".into(),
                seller_fee_basis_points: 100,
                is_collection: true,
                collection: None,
                update_authority: Some(authority),
            },
            CommitmentConfig::finalized()
        )]
    );
}

#[test]
fn create_collection_rejects_plain_descriptor() {
    let h = harness(false, Failures::default());
    let data = CollectionNftData {
        is_collection: false,
        ..CollectionNftData::nova_collection(Pubkey::new_unique())
    };

    assert!(create_collection_nft(&h.metaplex, "ipfs://abc", &data).is_err());
    assert!(calls(&h.log).is_empty());
}

#[test]
fn update_looks_up_token_before_updating() {
    let h = harness(false, Failures::default());
    let mint = Pubkey::new_unique();

    update_nft_uri(&h.metaplex, "ipfs://new", &mint).unwrap();

    assert_eq!(
        calls(&h.log),
        vec![
            Call::FindByMint(mint),
            Call::Update {
                mint,
                uri: "ipfs://new".into(),
                commitment: CommitmentConfig::finalized(),
            },
        ]
    );
}

#[test]
fn failed_lookup_stops_before_update() {
    let h = harness(
        false,
        Failures {
            find: true,
            ..Failures::default()
        },
    );
    let mint = Pubkey::new_unique();

    let result = update_nft_uri(&h.metaplex, "ipfs://new", &mint);

    assert!(result.is_err());
    assert_eq!(exit_status(&result), 1);
    assert_eq!(calls(&h.log), vec![Call::FindByMint(mint)]);
}

#[test]
fn failed_update_is_reported_after_lookup() {
    let h = harness(
        false,
        Failures {
            update: true,
            ..Failures::default()
        },
    );
    let mint = Pubkey::new_unique();

    let err = update_nft_uri(&h.metaplex, "ipfs://new", &mint).unwrap_err();

    assert!(format!("{:#}", err).contains("update rejected"));
    let log = calls(&h.log);
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], Call::FindByMint(mint));
    assert!(matches!(log[1], Call::Update { .. }));
}

#[test]
fn nova_descriptor_reaches_create_unchanged() {
    let h = harness(false, Failures::default());
    let data = NftData::nova();

    let uri = upload_metadata(&h.metaplex, &data, &assets_dir()).unwrap();
    create_nft(&h.metaplex, &uri, &data, &Pubkey::new_unique()).unwrap();

    let create = calls(&h.log)
        .into_iter()
        .find_map(|call| match call {
            Call::Create(input, _) => Some(input),
            _ => None,
        })
        .unwrap();
    assert_eq!(create.uri, "ipfs://abc");
    assert_eq!(create.name, "Nova");
    assert_eq!(create.symbol, "Nova #1");
    assert_eq!(create.seller_fee_basis_points, 0);
}

#[test]
fn run_creates_collection_then_verified_token() {
    let h = harness(false, Failures::default());

    let result = run(&h.metaplex, &settings());
    assert_eq!(exit_status(&result), 0);
    assert_eq!(result.unwrap(), h.metaplex.identity());

    let log = calls(&h.log);
    let kinds: Vec<&str> = log
        .iter()
        .map(|call| match call {
            Call::Upload { .. } => "upload",
            Call::Create(input, _) if input.is_collection => "create-collection",
            Call::Create(..) => "create",
            Call::Verify(_) => "verify",
            Call::FindByMint(_) => "find",
            Call::Update { .. } => "update",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "upload",
            "upload",
            "create-collection",
            "upload",
            "upload",
            "create",
            "verify",
        ]
    );
}

#[test]
fn run_reuses_configured_collection_and_updates() {
    let h = harness(false, Failures::default());
    let collection = Pubkey::new_unique();
    let update = Pubkey::new_unique();
    let settings = MintSettings {
        collection_mint: Some(collection),
        update_mint: Some(update),
        ..settings()
    };

    let result = run(&h.metaplex, &settings);
    assert_eq!(exit_status(&result), 0);

    let log = calls(&h.log);
    assert_eq!(log.iter().filter(|c| is_create(c)).count(), 1);
    assert!(is_create(&log[2]));
    match &log[3] {
        Call::Verify(input) => assert_eq!(input.collection_mint, collection),
        other => panic!("unexpected call {:?}", other),
    }
    assert_eq!(log[log.len() - 2], Call::FindByMint(update));
    assert!(matches!(log.last(), Some(Call::Update { mint, .. }) if *mint == update));
}

#[test]
fn run_exits_with_one_when_any_collaborator_fails() {
    let storage_down = harness(true, Failures::default());
    assert_eq!(exit_status(&run(&storage_down.metaplex, &settings())), 1);

    let create_rejected = harness(
        false,
        Failures {
            create: true,
            ..Failures::default()
        },
    );
    assert_eq!(exit_status(&run(&create_rejected.metaplex, &settings())), 1);

    let verify_rejected = harness(
        false,
        Failures {
            verify: true,
            ..Failures::default()
        },
    );
    assert_eq!(exit_status(&run(&verify_rejected.metaplex, &settings())), 1);

    let updating = MintSettings {
        collection_mint: Some(Pubkey::new_unique()),
        update_mint: Some(Pubkey::new_unique()),
        ..settings()
    };

    let find_rejected = harness(
        false,
        Failures {
            find: true,
            ..Failures::default()
        },
    );
    assert_eq!(exit_status(&run(&find_rejected.metaplex, &updating)), 1);
    assert!(!calls(&find_rejected.log)
        .iter()
        .any(|c| matches!(c, Call::Update { .. })));

    let update_rejected = harness(
        false,
        Failures {
            update: true,
            ..Failures::default()
        },
    );
    assert_eq!(exit_status(&run(&update_rejected.metaplex, &updating)), 1);

    let missing_assets = harness(false, Failures::default());
    let settings = MintSettings {
        assets_dir: PathBuf::from("no/such/dir"),
        ..settings()
    };
    assert_eq!(exit_status(&run(&missing_assets.metaplex, &settings)), 1);
    assert!(calls(&missing_assets.log).is_empty());
}
