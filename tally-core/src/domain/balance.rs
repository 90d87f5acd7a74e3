use crate::domain::record::OwnershipRecord;
use crate::foundation::{LedgerError, PartyId};
use std::collections::BTreeMap;

/// Per-issuer quantity sums over a record list.
///
/// Built by a checked fold and handed out read-only; callers compare input
/// and output sums but can never mutate a computed map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IssuerSums {
    sums: BTreeMap<PartyId, i64>,
}

impl IssuerSums {
    pub fn get(&self, issuer: &PartyId) -> Option<i64> {
        self.sums.get(issuer).copied()
    }

    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartyId, i64)> {
        self.sums.iter().map(|(issuer, sum)| (issuer, *sum))
    }

    /// True when both maps cover exactly the same issuers.
    pub fn same_issuers(&self, other: &IssuerSums) -> bool {
        self.sums.len() == other.sums.len() && self.sums.keys().eq(other.sums.keys())
    }
}

/// Fold records into per-issuer sums using overflow-checked addition.
///
/// Overflow short-circuits to [`LedgerError::ArithmeticOverflow`] naming the
/// issuer whose running sum overflowed; it is never a silent wraparound.
pub fn sum_by_issuer<'a>(records: impl IntoIterator<Item = &'a OwnershipRecord>) -> Result<IssuerSums, LedgerError> {
    let mut sums: BTreeMap<PartyId, i64> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(record.issuer.clone()).or_insert(0);
        *entry = entry
            .checked_add(record.quantity)
            .ok_or_else(|| LedgerError::ArithmeticOverflow { issuer: record.issuer.clone() })?;
    }
    Ok(IssuerSums { sums })
}
