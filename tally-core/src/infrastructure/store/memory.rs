use crate::domain::record::{RecordRef, StoredRecord};
use crate::domain::transition::FinalizedTransition;
use crate::foundation::{LedgerError, TransitionId};
use crate::infrastructure::store::{RecordFilter, RecordStore};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

struct MemoryInner {
    unspent: BTreeMap<RecordRef, StoredRecord>,
    transitions: HashMap<TransitionId, FinalizedTransition>,
}

pub struct MemoryRecordStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self { inner: Mutex::new(MemoryInner { unspent: BTreeMap::new(), transitions: HashMap::new() }) }
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, MemoryInner>, LedgerError> {
        self.inner.lock().map_err(|_| LedgerError::StorageError {
            operation: "memory store lock".to_string(),
            details: "poisoned".to_string(),
        })
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    fn persist_finalized(&self, finalized: &FinalizedTransition) -> Result<(), LedgerError> {
        let transition_id = finalized.id()?;
        let mut inner = self.lock_inner()?;
        if inner.transitions.contains_key(&transition_id) {
            return Ok(());
        }
        for input in &finalized.transition.inputs {
            inner.unspent.remove(&input.reference);
        }
        for (index, record) in finalized.transition.outputs.iter().enumerate() {
            let reference = RecordRef::new(transition_id, index as u32);
            inner.unspent.insert(reference, StoredRecord::new(reference, record.clone()));
        }
        inner.transitions.insert(transition_id, finalized.clone());
        Ok(())
    }

    fn get_transition(&self, transition_id: &TransitionId) -> Result<Option<FinalizedTransition>, LedgerError> {
        Ok(self.lock_inner()?.transitions.get(transition_id).cloned())
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>, LedgerError> {
        Ok(self.lock_inner()?.unspent.values().filter(|entry| filter.matches(entry)).cloned().collect())
    }

    fn get_unspent(&self, reference: &RecordRef) -> Result<Option<StoredRecord>, LedgerError> {
        Ok(self.lock_inner()?.unspent.get(reference).cloned())
    }
}
