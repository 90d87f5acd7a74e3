use crate::domain::transition::{PartySignature, ProposedTransition, SignedTransition};
use crate::foundation::{LedgerError, PartyId, SessionId, TransitionId};
use log::{info, warn};
use std::collections::BTreeSet;

/// Coordinator-side protocol phases. The happy path is linear; any phase
/// short of `Done` may fall to `Aborted` with a carried reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitPhase {
    Assembling,
    LocallyValidating,
    Signing,
    CollectingSignatures,
    Finalizing,
    Done,
    Aborted { reason: String },
}

impl std::fmt::Display for CommitPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aborted { reason } => write!(f, "Aborted({reason})"),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum PhaseState {
    Assembling,
    LocallyValidating,
    Signing,
    CollectingSignatures,
    Finalizing,
    Done,
    Aborted,
}

const VALID_TRANSITIONS: &[(PhaseState, PhaseState)] = &[
    (PhaseState::Assembling, PhaseState::LocallyValidating),
    (PhaseState::LocallyValidating, PhaseState::Signing),
    (PhaseState::Signing, PhaseState::CollectingSignatures),
    (PhaseState::CollectingSignatures, PhaseState::Finalizing),
    (PhaseState::Finalizing, PhaseState::Done),
    (PhaseState::Assembling, PhaseState::Aborted),
    (PhaseState::LocallyValidating, PhaseState::Aborted),
    (PhaseState::Signing, PhaseState::Aborted),
    (PhaseState::CollectingSignatures, PhaseState::Aborted),
    (PhaseState::Finalizing, PhaseState::Aborted),
];

fn phase_state(phase: &CommitPhase) -> PhaseState {
    match phase {
        CommitPhase::Assembling => PhaseState::Assembling,
        CommitPhase::LocallyValidating => PhaseState::LocallyValidating,
        CommitPhase::Signing => PhaseState::Signing,
        CommitPhase::CollectingSignatures => PhaseState::CollectingSignatures,
        CommitPhase::Finalizing => PhaseState::Finalizing,
        CommitPhase::Done => PhaseState::Done,
        CommitPhase::Aborted { .. } => PhaseState::Aborted,
    }
}

pub fn is_terminal(phase: &CommitPhase) -> bool {
    matches!(phase, CommitPhase::Done | CommitPhase::Aborted { .. })
}

/// Everything a suspended coordinator run carries across network round
/// trips: the immutable proposal, the current phase, and the signatures
/// accumulated so far. No call-stack context survives a suspension point.
#[derive(Clone, Debug)]
pub struct CommitRun {
    pub session_id: SessionId,
    pub transition_id: TransitionId,
    pub transition: ProposedTransition,
    phase: CommitPhase,
    signatures: Vec<PartySignature>,
}

impl CommitRun {
    pub fn new(session_id: SessionId, transition: ProposedTransition) -> Result<Self, LedgerError> {
        let transition_id = transition.id()?;
        Ok(Self { session_id, transition_id, transition, phase: CommitPhase::Assembling, signatures: Vec::new() })
    }

    pub fn phase(&self) -> &CommitPhase {
        &self.phase
    }

    pub fn advance(&mut self, next: CommitPhase) -> Result<(), LedgerError> {
        let from = phase_state(&self.phase);
        let to = phase_state(&next);
        if from != to && !VALID_TRANSITIONS.contains(&(from, to)) {
            warn!(
                "invalid commit phase transition session_id={} transition_id={} from={:?} to={:?}",
                self.session_id, self.transition_id, self.phase, next
            );
            return Err(LedgerError::InvalidStateTransition {
                from: format!("{:?}", self.phase),
                to: format!("{:?}", next),
            });
        }
        info!(
            "commit phase transition session_id={} transition_id={} from={:?} to={:?}",
            self.session_id, self.transition_id, self.phase, next
        );
        self.phase = next;
        Ok(())
    }

    pub fn abort(&mut self, reason: impl Into<String>) -> Result<(), LedgerError> {
        self.advance(CommitPhase::Aborted { reason: reason.into() })
    }

    /// Record a signature, rejecting duplicates and parties outside the
    /// required signer set.
    pub fn add_signature(&mut self, signature: PartySignature) -> Result<(), LedgerError> {
        if !self.transition.signers.contains(&signature.party) {
            return Err(LedgerError::Irrelevant { party: signature.party });
        }
        if self.signatures.iter().any(|existing| existing.party == signature.party) {
            return Err(LedgerError::DuplicateSignature { party: signature.party });
        }
        self.signatures.push(signature);
        Ok(())
    }

    pub fn signed_parties(&self) -> BTreeSet<PartyId> {
        self.signatures.iter().map(|sig| sig.party.clone()).collect()
    }

    /// Required signers that have not signed yet.
    pub fn outstanding_signers(&self) -> BTreeSet<PartyId> {
        let signed = self.signed_parties();
        self.transition.signers.iter().filter(|party| !signed.contains(*party)).cloned().collect()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.outstanding_signers().is_empty()
    }

    /// Package the run for notarization once every signature is in.
    pub fn into_signed(self) -> Result<SignedTransition, LedgerError> {
        if let Some(party) = self.outstanding_signers().into_iter().next() {
            return Err(LedgerError::SignerMissing { party });
        }
        Ok(SignedTransition { transition: self.transition, signatures: self.signatures })
    }
}
