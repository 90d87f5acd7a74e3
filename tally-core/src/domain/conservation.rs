use crate::domain::balance::sum_by_issuer;
use crate::domain::record::OwnershipRecord;
use crate::domain::signers::{distinct_parties, PartyRole};
use crate::domain::transition::{Operation, ProposedTransition};
use crate::foundation::{ConservationRule, LedgerError, PartyId};
use std::collections::BTreeSet;

/// Decide whether a proposed transition is legal.
///
/// Pure and deterministic: the same check runs as the coordinator's local
/// pre-flight, as every countersigner's admission check, and as the notary's
/// final admission check. Rules are evaluated in a fixed order and the first
/// failing rule is reported.
pub fn verify_transition(transition: &ProposedTransition) -> Result<(), LedgerError> {
    let inputs: Vec<OwnershipRecord> = transition.input_records().cloned().collect();
    verify_records(transition.operation, &inputs, &transition.outputs, &transition.signers)
}

/// Rule set over bare records, independent of how a proposal was packaged.
pub fn verify_records(
    operation: Operation,
    inputs: &[OwnershipRecord],
    outputs: &[OwnershipRecord],
    signers: &BTreeSet<PartyId>,
) -> Result<(), LedgerError> {
    match operation {
        Operation::Issue => {
            if !inputs.is_empty() {
                return Err(LedgerError::violation(ConservationRule::IssueConsumesRecords));
            }
            if outputs.is_empty() {
                return Err(LedgerError::violation(ConservationRule::IssueProducesNothing));
            }
            all_quantities_positive(inputs, outputs)?;
            signers_cover(signers, distinct_parties(outputs, PartyRole::Issuer))
        }
        Operation::Move => {
            if inputs.is_empty() {
                return Err(LedgerError::violation(ConservationRule::MoveConsumesNothing));
            }
            if outputs.is_empty() {
                return Err(LedgerError::violation(ConservationRule::MoveProducesNothing));
            }
            all_quantities_positive(inputs, outputs)?;
            signers_cover(signers, distinct_parties(inputs, PartyRole::Holder))?;

            let consumed = sum_by_issuer(inputs)?;
            let produced = sum_by_issuer(outputs)?;
            if !consumed.same_issuers(&produced) {
                return Err(LedgerError::violation(ConservationRule::IssuerSetChanged));
            }
            for (issuer, sum) in consumed.iter() {
                // Key sets already match, so the lookup cannot miss.
                let produced_sum = produced.get(issuer).unwrap_or(0);
                if produced_sum != sum {
                    return Err(LedgerError::violation(ConservationRule::IssuerSumChanged {
                        issuer: issuer.clone(),
                        consumed: sum,
                        produced: produced_sum,
                    }));
                }
            }
            Ok(())
        }
        Operation::Redeem => {
            if inputs.is_empty() {
                return Err(LedgerError::violation(ConservationRule::RedeemConsumesNothing));
            }
            if !outputs.is_empty() {
                return Err(LedgerError::violation(ConservationRule::RedeemProducesRecords));
            }
            all_quantities_positive(inputs, outputs)?;
            signers_cover(signers, distinct_parties(inputs, PartyRole::Issuer))?;
            signers_cover(signers, distinct_parties(inputs, PartyRole::Holder))
        }
    }
}

fn all_quantities_positive(inputs: &[OwnershipRecord], outputs: &[OwnershipRecord]) -> Result<(), LedgerError> {
    for record in inputs.iter().chain(outputs) {
        if record.quantity <= 0 {
            return Err(LedgerError::violation(ConservationRule::QuantityNotPositive { quantity: record.quantity }));
        }
    }
    Ok(())
}

fn signers_cover(signers: &BTreeSet<PartyId>, required: BTreeSet<PartyId>) -> Result<(), LedgerError> {
    for party in required {
        if !signers.contains(&party) {
            return Err(LedgerError::SignerMissing { party });
        }
    }
    Ok(())
}
