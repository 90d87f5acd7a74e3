use crate::domain::record::OwnershipRecord;
use crate::domain::transition::Operation;
use crate::foundation::PartyId;
use std::collections::BTreeSet;

/// Which field of a record an identity is projected from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartyRole {
    Issuer,
    Holder,
}

/// Distinct identities appearing in `records` under the given role.
pub fn distinct_parties<'a>(records: impl IntoIterator<Item = &'a OwnershipRecord>, role: PartyRole) -> BTreeSet<PartyId> {
    records
        .into_iter()
        .map(|record| match role {
            PartyRole::Issuer => record.issuer.clone(),
            PartyRole::Holder => record.holder.clone(),
        })
        .collect()
}

/// The identities whose authorization a transition requires.
///
/// Issue: issuers of the produced records. Move: holders of the consumed
/// records. Redeem: issuers and holders of the consumed records.
pub fn required_signers(operation: Operation, inputs: &[OwnershipRecord], outputs: &[OwnershipRecord]) -> BTreeSet<PartyId> {
    match operation {
        Operation::Issue => distinct_parties(outputs, PartyRole::Issuer),
        Operation::Move => distinct_parties(inputs, PartyRole::Holder),
        Operation::Redeem => {
            let mut signers = distinct_parties(inputs, PartyRole::Issuer);
            signers.extend(distinct_parties(inputs, PartyRole::Holder));
            signers
        }
    }
}
