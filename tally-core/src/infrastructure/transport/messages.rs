use crate::domain::commit::TransactionRole;
use crate::domain::transition::{FinalizedTransition, ProposedTransition};
use crate::foundation::{PartyId, PayloadHash, SessionId, TransitionId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MessageEnvelope {
    pub sender: PartyId,
    pub recipient: PartyId,
    pub session_id: SessionId,
    pub seq_no: u64,
    pub timestamp_nanos: u64,
    pub payload: ProtocolMessage,
    pub payload_hash: PayloadHash,
    pub signature: Vec<u8>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum ProtocolMessage {
    /// Coordinator tells a contacted party which role it plays this session.
    RoleAssign(RoleAssign),
    /// Coordinator solicits a countersignature over a proposal.
    SignatureRequest(SignatureRequest),
    /// A solicited signer accepts (with a signature) or declines (with a reason).
    SignatureReply(SignatureReply),
    /// Coordinator fans out the notarized transition to every stakeholder.
    FinalizedNotice(FinalizedNotice),
    /// Coordinator abandons the session; no countersignature will be used.
    AbortNotice(AbortNotice),
}

impl ProtocolMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoleAssign(_) => "role_assign",
            Self::SignatureRequest(_) => "signature_request",
            Self::SignatureReply(_) => "signature_reply",
            Self::FinalizedNotice(_) => "finalized_notice",
            Self::AbortNotice(_) => "abort_notice",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoleAssign {
    pub role: TransactionRole,
    pub coordinator: PartyId,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SignatureRequest {
    /// Claimed id, cross-checked by the receiver against its own computation.
    pub transition_id: TransitionId,
    pub transition: ProposedTransition,
    pub coordinator: PartyId,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SignatureReply {
    pub transition_id: TransitionId,
    pub signer: PartyId,
    pub accept: bool,
    pub reason: Option<String>,
    /// Present iff `accept`.
    pub signature: Option<Vec<u8>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FinalizedNotice {
    pub finalized: FinalizedTransition,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AbortNotice {
    pub transition_id: TransitionId,
    pub reason: String,
}
