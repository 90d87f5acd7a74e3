//! Durable record store boundary.
//!
//! The protocol core only reads candidate input records and hands back
//! finalized transitions; indexing and query strategy belong to the
//! implementation behind the trait.

pub mod memory;

pub use memory::MemoryRecordStore;

use crate::domain::record::{RecordRef, StoredRecord};
use crate::domain::transition::FinalizedTransition;
use crate::foundation::{LedgerError, PartyId, TransitionId};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Filter over unspent records. `None` fields match everything.
#[derive(Clone, Debug, Default)]
pub struct RecordFilter {
    pub holder: Option<PartyId>,
    pub issuer: Option<PartyId>,
}

impl RecordFilter {
    pub fn by_holder(holder: impl Into<PartyId>) -> Self {
        Self { holder: Some(holder.into()), issuer: None }
    }

    pub fn by_issuer(issuer: impl Into<PartyId>) -> Self {
        Self { holder: None, issuer: Some(issuer.into()) }
    }

    pub fn matches(&self, record: &StoredRecord) -> bool {
        if let Some(holder) = &self.holder {
            if &record.record.holder != holder {
                return false;
            }
        }
        if let Some(issuer) = &self.issuer {
            if &record.record.issuer != issuer {
                return false;
            }
        }
        true
    }
}

pub trait RecordStore: Send + Sync {
    /// Apply a finalized transition to the local view: consumed inputs leave
    /// the unspent set, produced outputs join it. Idempotent per transition.
    fn persist_finalized(&self, finalized: &FinalizedTransition) -> Result<()>;

    fn get_transition(&self, transition_id: &TransitionId) -> Result<Option<FinalizedTransition>>;

    /// Unspent records matching the filter, in stable reference order.
    fn query(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>>;

    fn get_unspent(&self, reference: &RecordRef) -> Result<Option<StoredRecord>>;
}
