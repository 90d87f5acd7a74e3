//! Session transport: point-to-point ordered delivery of protocol messages.
//!
//! The coordinator opens independent conversations with each required signer
//! and stakeholder; delivery failure surfaces as [`LedgerError::PeerUnreachable`]
//! and aborts the in-flight proposal. Timeout policy lives here, not in the
//! protocol core.

pub mod messages;
pub mod mock;

pub use messages::{
    AbortNotice, FinalizedNotice, MessageEnvelope, ProtocolMessage, RoleAssign, SignatureReply, SignatureRequest,
};

use crate::foundation::{LedgerError, PartyId, SessionId};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

pub type Result<T> = std::result::Result<T, LedgerError>;

pub struct TransportSubscription {
    inner: BoxStream<'static, Result<MessageEnvelope>>,
}

impl TransportSubscription {
    pub fn new(inner: BoxStream<'static, Result<MessageEnvelope>>) -> Self {
        Self { inner }
    }

    pub async fn next(&mut self) -> Option<Result<MessageEnvelope>> {
        self.inner.next().await
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_role(&self, to: &PartyId, session_id: SessionId, role: RoleAssign) -> Result<()>;
    async fn send_signature_request(&self, to: &PartyId, session_id: SessionId, request: SignatureRequest) -> Result<()>;
    async fn send_signature_reply(&self, to: &PartyId, session_id: SessionId, reply: SignatureReply) -> Result<()>;
    async fn send_finalized(&self, to: &PartyId, session_id: SessionId, notice: FinalizedNotice) -> Result<()>;
    async fn send_abort(&self, to: &PartyId, session_id: SessionId, notice: AbortNotice) -> Result<()>;
    /// Subscribe to every message addressed to `party`.
    async fn subscribe(&self, party: &PartyId) -> Result<TransportSubscription>;
}
