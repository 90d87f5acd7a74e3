use crate::domain::record::{OwnershipRecord, StoredRecord};
use crate::domain::signers::required_signers;
use crate::domain::transition::{Operation, ProposedTransition};
use crate::foundation::{LedgerError, PartyId};

/// Mint new records: one output per `(holder, quantity)` pair, all issued
/// by `issuer`.
#[derive(Clone, Debug)]
pub struct IssueIntent {
    pub issuer: PartyId,
    pub holdings: Vec<(PartyId, i64)>,
}

impl IssueIntent {
    pub fn single(issuer: impl Into<PartyId>, holder: impl Into<PartyId>, quantity: i64) -> Self {
        Self { issuer: issuer.into(), holdings: vec![(holder.into(), quantity)] }
    }

    pub fn assemble(self) -> Result<ProposedTransition, LedgerError> {
        if self.holdings.is_empty() {
            return Err(LedgerError::MalformedIntent("issue requires at least one holding".to_string()));
        }
        if let Some((holder, quantity)) = self.holdings.iter().find(|(_, quantity)| *quantity <= 0) {
            return Err(LedgerError::MalformedIntent(format!(
                "issue quantity for {} must be positive, got {}",
                holder, quantity
            )));
        }
        let outputs: Vec<OwnershipRecord> = self
            .holdings
            .into_iter()
            .map(|(holder, quantity)| OwnershipRecord { issuer: self.issuer.clone(), holder, quantity })
            .collect();
        let signers = required_signers(Operation::Issue, &[], &outputs);
        Ok(ProposedTransition { operation: Operation::Issue, inputs: Vec::new(), outputs, signers })
    }
}

/// Transfer selected records to a caller-chosen output shape.
#[derive(Clone, Debug)]
pub struct MoveIntent {
    pub inputs: Vec<StoredRecord>,
    pub outputs: Vec<OwnershipRecord>,
}

impl MoveIntent {
    pub fn assemble(self) -> Result<ProposedTransition, LedgerError> {
        if self.inputs.is_empty() {
            return Err(LedgerError::MalformedIntent("move requires at least one input record".to_string()));
        }
        if self.outputs.is_empty() {
            return Err(LedgerError::MalformedIntent("move requires at least one output record".to_string()));
        }
        if let Some(output) = self.outputs.iter().find(|output| output.quantity <= 0) {
            return Err(LedgerError::MalformedIntent(format!(
                "move output quantity for {} must be positive, got {}",
                output.holder, output.quantity
            )));
        }
        let input_records: Vec<OwnershipRecord> = self.inputs.iter().map(|entry| entry.record.clone()).collect();
        let signers = required_signers(Operation::Move, &input_records, &self.outputs);
        Ok(ProposedTransition { operation: Operation::Move, inputs: self.inputs, outputs: self.outputs, signers })
    }
}

/// Retire selected records entirely.
#[derive(Clone, Debug)]
pub struct RedeemIntent {
    pub inputs: Vec<StoredRecord>,
}

impl RedeemIntent {
    pub fn assemble(self) -> Result<ProposedTransition, LedgerError> {
        if self.inputs.is_empty() {
            return Err(LedgerError::MalformedIntent("redeem requires at least one input record".to_string()));
        }
        let input_records: Vec<OwnershipRecord> = self.inputs.iter().map(|entry| entry.record.clone()).collect();
        let signers = required_signers(Operation::Redeem, &input_records, &[]);
        Ok(ProposedTransition { operation: Operation::Redeem, inputs: self.inputs, outputs: Vec::new(), signers })
    }
}
