use crate::domain::transition::Operation;
use crate::foundation::{PartyId, TransitionId};

/// Hook for observing protocol progress, e.g. for metrics or a progress UI.
///
/// All methods default to no-ops so observers implement only what they need.
pub trait LifecycleObserver: Send + Sync {
    fn on_proposed(&self, _transition_id: &TransitionId, _operation: Operation) {}
    fn on_signature_collected(&self, _transition_id: &TransitionId, _signer: &PartyId) {}
    fn on_finalized(&self, _transition_id: &TransitionId, _sequence: u64) {}
    fn on_aborted(&self, _transition_id: &TransitionId, _reason: &str) {}
}

pub struct NoopObserver;

impl LifecycleObserver for NoopObserver {}
