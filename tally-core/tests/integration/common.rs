use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tally_core::application::{CommitSettings, PartyNode};
use tally_core::domain::StoredRecord;
use tally_core::foundation::PartyId;
use tally_core::infrastructure::identity::{Ed25519Identity, StaticDirectory};
use tally_core::infrastructure::notary::LocalNotary;
use tally_core::infrastructure::store::MemoryRecordStore;
use tally_core::infrastructure::transport::mock::{MockHub, MockTransport};

pub const NOTARY_NAME: &str = "notary";

/// A set of party nodes sharing one in-process hub and one notary.
pub struct TestNet {
    pub notary: Arc<LocalNotary>,
    nodes: HashMap<String, Arc<PartyNode>>,
}

impl TestNet {
    pub fn node(&self, name: &str) -> Arc<PartyNode> {
        self.nodes.get(name).cloned().unwrap_or_else(|| panic!("unknown test party {name}"))
    }
}

pub fn settings() -> CommitSettings {
    CommitSettings { notary_party: PartyId::from(NOTARY_NAME), session_timeout: Duration::from_secs(5) }
}

/// Build a network of named parties with fresh random identities.
pub fn build_network(names: &[&str]) -> TestNet {
    let hub = Arc::new(MockHub::new());
    let identities: Vec<Ed25519Identity> = names
        .iter()
        .map(|name| {
            let seed: [u8; 32] = rand::random();
            Ed25519Identity::from_seed(PartyId::from(*name), seed)
        })
        .collect();
    let resolver = Arc::new(StaticDirectory::from_entries(
        identities.iter().map(|identity| (identity.party_id().clone(), identity.verifying_key())),
    ));
    let notary = Arc::new(LocalNotary::new(PartyId::from(NOTARY_NAME), resolver.clone()));

    let nodes = identities
        .into_iter()
        .map(|identity| {
            let name = identity.party_id().as_str().to_string();
            let transport = Arc::new(MockTransport::new(hub.clone(), identity.party_id().clone()));
            let store = Arc::new(MemoryRecordStore::new());
            let node = PartyNode::new(identity, resolver.clone(), transport, notary.clone(), store, settings());
            (name, Arc::new(node))
        })
        .collect();

    TestNet { notary, nodes }
}

/// Spawn responder loops for the given parties and give them a moment to
/// subscribe before any coordinator starts sending.
pub async fn spawn_responders(net: &TestNet, names: &[&str]) {
    for name in names {
        net.node(name).spawn_responder();
    }
    settle().await;
}

/// Let in-flight messages drain.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

/// Holdings as `(issuer, holder, quantity)` triples for easy assertions.
pub fn holding_triples(records: &[StoredRecord]) -> Vec<(String, String, i64)> {
    let mut triples: Vec<(String, String, i64)> = records
        .iter()
        .map(|entry| {
            (entry.record.issuer.as_str().to_string(), entry.record.holder.as_str().to_string(), entry.record.quantity)
        })
        .collect();
    triples.sort();
    triples
}
