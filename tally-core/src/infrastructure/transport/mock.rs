//! In-process transport for tests and single-process deployments.
//!
//! Every party owns one inbox topic on a shared hub; point-to-point sends
//! publish to the recipient's topic. A send to a party with no live
//! subscription is a delivery failure, unlike a gossip transport where an
//! empty topic is normal.

use super::messages::{
    AbortNotice, FinalizedNotice, MessageEnvelope, ProtocolMessage, RoleAssign, SignatureReply, SignatureRequest,
};
use super::{Transport, TransportSubscription};
use crate::foundation::constants::INBOX_CHANNEL_CAPACITY;
use crate::foundation::util::time::now_nanos;
use crate::foundation::{Hash32, LedgerError, PartyId, PayloadHash, SessionId};
use async_trait::async_trait;
use bincode::Options;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

pub struct MockHub {
    topics: Mutex<HashMap<Hash32, broadcast::Sender<MessageEnvelope>>>,
}

impl MockHub {
    pub fn new() -> Self {
        Self { topics: Mutex::new(HashMap::new()) }
    }

    async fn topic(&self, topic: Hash32) -> broadcast::Sender<MessageEnvelope> {
        let mut guard = self.topics.lock().await;
        guard.entry(topic).or_insert_with(|| broadcast::channel(INBOX_CHANNEL_CAPACITY).0).clone()
    }
}

impl Default for MockHub {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MockTransport {
    hub: Arc<MockHub>,
    sender: PartyId,
    seq: AtomicU64,
}

impl MockTransport {
    pub fn new(hub: Arc<MockHub>, sender: PartyId) -> Self {
        Self { hub, sender, seq: AtomicU64::new(1) }
    }

    fn inbox_topic_id(party: &PartyId) -> Hash32 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"tally/inbox/v1");
        hasher.update(party.as_str().as_bytes());
        *hasher.finalize().as_bytes()
    }

    fn payload_hash(payload: &ProtocolMessage) -> Result<PayloadHash, LedgerError> {
        let bytes = bincode::DefaultOptions::new().with_fixint_encoding().serialize(payload)?;
        Ok(PayloadHash::new(*blake3::hash(&bytes).as_bytes()))
    }

    async fn publish(&self, to: &PartyId, session_id: SessionId, payload: ProtocolMessage) -> Result<(), LedgerError> {
        let payload_hash = Self::payload_hash(&payload)?;
        let kind = payload.kind();
        let envelope = MessageEnvelope {
            sender: self.sender.clone(),
            recipient: to.clone(),
            session_id,
            seq_no: self.seq.fetch_add(1, Ordering::Relaxed),
            timestamp_nanos: now_nanos(),
            payload,
            payload_hash,
            signature: Vec::new(),
        };
        let topic = self.hub.topic(Self::inbox_topic_id(to)).await;
        topic.send(envelope).map_err(|_| LedgerError::PeerUnreachable {
            party: to.clone(),
            details: format!("no live subscription for {kind}"),
        })?;
        Ok(())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_role(&self, to: &PartyId, session_id: SessionId, role: RoleAssign) -> Result<(), LedgerError> {
        self.publish(to, session_id, ProtocolMessage::RoleAssign(role)).await
    }

    async fn send_signature_request(
        &self,
        to: &PartyId,
        session_id: SessionId,
        request: SignatureRequest,
    ) -> Result<(), LedgerError> {
        self.publish(to, session_id, ProtocolMessage::SignatureRequest(request)).await
    }

    async fn send_signature_reply(
        &self,
        to: &PartyId,
        session_id: SessionId,
        reply: SignatureReply,
    ) -> Result<(), LedgerError> {
        self.publish(to, session_id, ProtocolMessage::SignatureReply(reply)).await
    }

    async fn send_finalized(&self, to: &PartyId, session_id: SessionId, notice: FinalizedNotice) -> Result<(), LedgerError> {
        self.publish(to, session_id, ProtocolMessage::FinalizedNotice(notice)).await
    }

    async fn send_abort(&self, to: &PartyId, session_id: SessionId, notice: AbortNotice) -> Result<(), LedgerError> {
        self.publish(to, session_id, ProtocolMessage::AbortNotice(notice)).await
    }

    async fn subscribe(&self, party: &PartyId) -> Result<TransportSubscription, LedgerError> {
        let topic = self.hub.topic(Self::inbox_topic_id(party)).await;
        let mut receiver = topic.subscribe();
        let stream = async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(envelope) => yield Ok(envelope),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        yield Err(LedgerError::TransportError {
                            operation: "subscribe".to_string(),
                            details: format!("inbox lagged, {skipped} message(s) dropped"),
                        });
                    }
                }
            }
        };
        Ok(TransportSubscription::new(Box::pin(stream)))
    }
}
