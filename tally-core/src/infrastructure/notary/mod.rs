//! The notarizing authority boundary.
//!
//! The authority is an opaque oracle with two duties the commit protocol
//! depends on: it refuses any submission that would consume an input record
//! a previously finalized transition already consumed, and it stamps each
//! accepted transition into a total order. How the authority reaches its own
//! internal consensus is out of scope; [`LocalNotary`] is the in-process
//! implementation used by tests and single-authority deployments.

use crate::domain::conservation::verify_transition;
use crate::domain::record::RecordRef;
use crate::domain::transition::{FinalizedTransition, NotaryStamp, SignedTransition};
use crate::foundation::util::time::now_nanos;
use crate::foundation::{LedgerError, PartyId, TransitionId};
use crate::infrastructure::identity::{verify_full_authorization, IdentityResolver};
use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[async_trait]
pub trait Notary: Send + Sync {
    /// Admit a fully-signed transition into the total order, or reject it.
    ///
    /// Admission guarantees each referenced input record is consumed at most
    /// once across every submission the authority ever accepts.
    async fn submit(&self, submission: SignedTransition) -> Result<FinalizedTransition, LedgerError>;
}

struct NotaryInner {
    /// Which finalized transition consumed each record.
    consumed: HashMap<RecordRef, TransitionId>,
    /// Transition ids already stamped, for replay detection.
    finalized: HashMap<TransitionId, u64>,
    sequence: u64,
}

pub struct LocalNotary {
    party_id: PartyId,
    resolver: Arc<dyn IdentityResolver>,
    inner: Mutex<NotaryInner>,
}

impl LocalNotary {
    pub fn new(party_id: PartyId, resolver: Arc<dyn IdentityResolver>) -> Self {
        Self {
            party_id,
            resolver,
            inner: Mutex::new(NotaryInner { consumed: HashMap::new(), finalized: HashMap::new(), sequence: 0 }),
        }
    }

    pub fn party_id(&self) -> &PartyId {
        &self.party_id
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, NotaryInner>, LedgerError> {
        self.inner.lock().map_err(|_| LedgerError::StorageError {
            operation: "notary lock".to_string(),
            details: "poisoned".to_string(),
        })
    }
}

#[async_trait]
impl Notary for LocalNotary {
    async fn submit(&self, submission: SignedTransition) -> Result<FinalizedTransition, LedgerError> {
        let transition_id = submission.transition.id()?;

        // Final admission check: the notary re-validates instead of trusting
        // the coordinator's pre-flight.
        verify_transition(&submission.transition)?;
        verify_full_authorization(self.resolver.as_ref(), &submission.transition, &submission.signatures)?;

        let mut inner = self.lock_inner()?;
        if let Some(sequence) = inner.finalized.get(&transition_id) {
            warn!("notary rejecting replayed transition transition_id={} sequence={}", transition_id, sequence);
            return Err(LedgerError::NotarizationRejected {
                reason: format!("transition {} already finalized at sequence {}", transition_id, sequence),
            });
        }
        for input in &submission.transition.inputs {
            if let Some(spender) = inner.consumed.get(&input.reference) {
                warn!(
                    "notary rejecting double consumption reference={} spender={} transition_id={}",
                    input.reference, spender, transition_id
                );
                return Err(LedgerError::NotarizationRejected {
                    reason: format!("input {} already consumed by transition {}", input.reference, spender),
                });
            }
        }

        inner.sequence += 1;
        let stamp = NotaryStamp { notary: self.party_id.clone(), sequence: inner.sequence, timestamp_nanos: now_nanos() };
        for input in &submission.transition.inputs {
            inner.consumed.insert(input.reference, transition_id);
        }
        let sequence = inner.sequence;
        inner.finalized.insert(transition_id, sequence);
        info!(
            "notarized transition transition_id={} operation={} sequence={}",
            transition_id, submission.transition.operation, stamp.sequence
        );

        Ok(FinalizedTransition { transition: submission.transition, signatures: submission.signatures, stamp })
    }
}
