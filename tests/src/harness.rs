//! In-process cluster harness.
//!
//! Every node is a full `SubsystemContainer` with a `MemoryNetwork` transport,
//! an in-memory snapshot store unless told otherwise, and a shared manual
//! clock so expiry can be driven deterministically.

use gs_01_data_store::{DataStore, MemorySnapshotStore, SnapshotStore};
use gs_04_protocol::{InboundMessageHandler, ProtocolHandler};
use node_runtime::adapters::{MemoryLink, MemoryNetwork};
use node_runtime::{NodeConfig, SubsystemContainer};
use shared_crypto::{EntrySigner, OwnerKeyPair};
use shared_types::{
    AlertPayload, Entry, MailboxPayload, ManualTimeSource, OfferDirection, OfferPayload,
    StoragePayload, Timestamp,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const T0: Timestamp = 1_700_000_000_000;
pub const MINUTE: u64 = 60_000;

pub struct TestNode {
    pub container: Arc<SubsystemContainer>,
    pub network: Arc<MemoryNetwork>,
}

impl TestNode {
    /// Must be called inside a Tokio runtime.
    pub fn spawn(time: &Arc<ManualTimeSource>) -> Self {
        Self::spawn_with(NodeConfig::default(), time, Arc::new(MemorySnapshotStore::new()))
    }

    pub fn spawn_with(
        config: NodeConfig,
        time: &Arc<ManualTimeSource>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        let network = MemoryNetwork::new();
        let container = SubsystemContainer::build(config, network.clone(), snapshots, time.clone())
            .expect("node builds");
        let handler: Arc<dyn InboundMessageHandler> = container.protocol.clone();
        network.attach(handler);
        Self {
            container: Arc::new(container),
            network,
        }
    }

    pub fn store(&self) -> &DataStore {
        &self.container.store
    }

    pub fn protocol(&self) -> &ProtocolHandler {
        &self.container.protocol
    }
}

pub fn connect(a: &TestNode, b: &TestNode) -> MemoryLink {
    MemoryNetwork::link(&a.network, &b.network)
}

pub fn clock() -> Arc<ManualTimeSource> {
    Arc::new(ManualTimeSource::new(T0))
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Give queued sends a chance to run when asserting that nothing arrives.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

pub fn owner(seed: u8) -> OwnerKeyPair {
    OwnerKeyPair::from_seed([seed; 32])
}

pub fn signed(owner: &OwnerKeyPair, payload: StoragePayload, seq: u64, created: Timestamp, ttl: u64) -> Entry {
    EntrySigner::new(owner)
        .entry(payload, seq, created, ttl)
        .expect("entry signs")
}

pub fn offer(id: &str) -> StoragePayload {
    StoragePayload::Offer(OfferPayload {
        offer_id: id.to_string(),
        owner_node_address: "maker.onion:9999".to_string(),
        direction: OfferDirection::Sell,
        base_currency: "BTC".to_string(),
        counter_currency: "EUR".to_string(),
        price: 6_100_000,
        amount: 100_000,
        min_amount: 10_000,
        date_ms: T0,
        extra_data: BTreeMap::new(),
    })
}

pub fn alert(message: &str) -> StoragePayload {
    StoragePayload::Alert(AlertPayload {
        message: message.to_string(),
        version: "1.9.0".to_string(),
        is_update_info: false,
    })
}

pub fn mailbox(uid: &str) -> StoragePayload {
    StoragePayload::Mailbox(MailboxPayload {
        receiver_address: "receiver.onion:9999".to_string(),
        uid: uid.to_string(),
        sealed_content: vec![0xAB; 64],
    })
}
