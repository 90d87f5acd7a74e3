use crate::foundation::{PartyId, TransitionId};
use serde::{Deserialize, Serialize};

/// A fungible ownership unit on the ledger.
///
/// Records are immutable and linear: a record is either untouched or consumed
/// whole by a later transition. Partial spends consume one record and produce
/// new records carrying the remainder. Positivity of `quantity` is a validator
/// rule, not a construction invariant, so malformed proposals are rejected
/// instead of being unrepresentable.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct OwnershipRecord {
    /// The party that created the value and owes it meaning.
    pub issuer: PartyId,
    /// The party whose authorization is required to consume this record.
    pub holder: PartyId,
    /// Amount carried, in indivisible units.
    pub quantity: i64,
}

impl OwnershipRecord {
    pub fn new(issuer: impl Into<PartyId>, holder: impl Into<PartyId>, quantity: i64) -> Self {
        Self { issuer: issuer.into(), holder: holder.into(), quantity }
    }
}

impl std::fmt::Display for OwnershipRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} held by {}", self.quantity, self.issuer, self.holder)
    }
}

/// Stable reference to the transition output that created a record.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordRef {
    pub transition_id: TransitionId,
    pub output_index: u32,
}

impl RecordRef {
    pub fn new(transition_id: TransitionId, output_index: u32) -> Self {
        Self { transition_id, output_index }
    }
}

impl std::fmt::Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transition_id, self.output_index)
    }
}

/// A record together with the reference that locates it on the ledger.
///
/// This is what the record store hands out and what Move/Redeem intents
/// consume; embedding the full record lets every countersigning party
/// re-validate the proposal without a store lookup.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StoredRecord {
    pub reference: RecordRef,
    pub record: OwnershipRecord,
}

impl StoredRecord {
    pub fn new(reference: RecordRef, record: OwnershipRecord) -> Self {
        Self { reference, record }
    }
}
