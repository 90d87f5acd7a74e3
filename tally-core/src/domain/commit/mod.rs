//! Commit protocol state, shared between initiator and responder roles.

pub mod phase;
pub mod responder;

pub use phase::{CommitPhase, CommitRun};
pub use responder::{ParticipantPhase, ParticipantRun};

use serde::{Deserialize, Serialize};

/// The role a coordinator assigns to a contacted party.
///
/// A `Signer` must countersign the proposal; a `Participant` only receives
/// the finalized result (e.g. a new holder that consumed nothing). A party
/// that qualifies for both is addressed once, as a signer.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionRole {
    Signer,
    Participant,
}

impl std::fmt::Display for TransactionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signer => write!(f, "signer"),
            Self::Participant => write!(f, "participant"),
        }
    }
}
