use crate::domain::commit::TransactionRole;
use crate::domain::transition::ProposedTransition;
use crate::foundation::{LedgerError, SessionId};
use log::{info, warn};

/// Responder-side protocol phases.
///
/// A `Signer` role passes through `Signing`; a `Participant` role passes
/// through `Skipping`. Both wait for the finalized transition (or an abort
/// notice) before concluding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticipantPhase {
    AwaitingRole,
    Signing,
    Skipping,
    AwaitingFinality,
    Done,
}

const VALID_TRANSITIONS: &[(ParticipantPhase, ParticipantPhase)] = &[
    (ParticipantPhase::AwaitingRole, ParticipantPhase::Signing),
    (ParticipantPhase::AwaitingRole, ParticipantPhase::Skipping),
    (ParticipantPhase::Signing, ParticipantPhase::AwaitingFinality),
    (ParticipantPhase::Skipping, ParticipantPhase::AwaitingFinality),
    (ParticipantPhase::AwaitingFinality, ParticipantPhase::Done),
    // An abort notice concludes a run from any non-terminal phase.
    (ParticipantPhase::AwaitingRole, ParticipantPhase::Done),
    (ParticipantPhase::Signing, ParticipantPhase::Done),
    (ParticipantPhase::Skipping, ParticipantPhase::Done),
];

/// One responder conversation, keyed by session.
#[derive(Clone, Debug)]
pub struct ParticipantRun {
    pub session_id: SessionId,
    pub role: Option<TransactionRole>,
    /// Set once a proposal has been validated and countersigned.
    pub transition: Option<ProposedTransition>,
    phase: ParticipantPhase,
}

impl ParticipantRun {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id, role: None, transition: None, phase: ParticipantPhase::AwaitingRole }
    }

    pub fn phase(&self) -> &ParticipantPhase {
        &self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == ParticipantPhase::Done
    }

    pub fn advance(&mut self, next: ParticipantPhase) -> Result<(), LedgerError> {
        if self.phase != next && !VALID_TRANSITIONS.contains(&(self.phase, next)) {
            warn!(
                "invalid participant phase transition session_id={} from={:?} to={:?}",
                self.session_id, self.phase, next
            );
            return Err(LedgerError::InvalidStateTransition {
                from: format!("{:?}", self.phase),
                to: format!("{:?}", next),
            });
        }
        info!(
            "participant phase transition session_id={} from={:?} to={:?}",
            self.session_id, self.phase, next
        );
        self.phase = next;
        Ok(())
    }

    /// Apply a role assignment received from the coordinator.
    pub fn assign_role(&mut self, role: TransactionRole) -> Result<(), LedgerError> {
        self.role = Some(role);
        match role {
            TransactionRole::Signer => self.advance(ParticipantPhase::Signing),
            TransactionRole::Participant => {
                self.advance(ParticipantPhase::Skipping)?;
                self.advance(ParticipantPhase::AwaitingFinality)
            }
        }
    }
}
