use crate::application::coordinator::{CommitSettings, Coordinator};
use crate::application::participant::Participant;
use crate::domain::assemble::{IssueIntent, MoveIntent, RedeemIntent};
use crate::domain::balance::{sum_by_issuer, IssuerSums};
use crate::domain::record::{OwnershipRecord, RecordRef, StoredRecord};
use crate::domain::transition::FinalizedTransition;
use crate::foundation::{LedgerError, PartyId};
use crate::infrastructure::identity::{Ed25519Identity, IdentityResolver};
use crate::infrastructure::notary::Notary;
use crate::infrastructure::store::{RecordFilter, RecordStore};
use crate::infrastructure::transport::Transport;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// One party's node: the thin caller-facing surface over the commit
/// protocol. Wires the coordinator and participant roles to the same
/// identity, transport, notary, and record store.
pub struct PartyNode {
    identity: Ed25519Identity,
    store: Arc<dyn RecordStore>,
    coordinator: Coordinator,
    participant: Arc<Participant>,
}

impl PartyNode {
    pub fn new(
        identity: Ed25519Identity,
        resolver: Arc<dyn IdentityResolver>,
        transport: Arc<dyn Transport>,
        notary: Arc<dyn Notary>,
        store: Arc<dyn RecordStore>,
        settings: CommitSettings,
    ) -> Self {
        let coordinator = Coordinator::new(
            identity.clone(),
            resolver.clone(),
            transport.clone(),
            notary,
            store.clone(),
            settings.clone(),
        );
        let participant = Arc::new(Participant::new(identity.clone(), resolver, transport, store.clone(), settings));
        Self { identity, store, coordinator, participant }
    }

    pub fn party_id(&self) -> &PartyId {
        self.identity.party_id()
    }

    /// Direct access to the initiator role, for callers that assemble their
    /// own proposals.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Run the responder loop until the transport closes.
    pub fn spawn_responder(&self) -> JoinHandle<Result<(), LedgerError>> {
        let participant = self.participant.clone();
        tokio::spawn(async move { participant.serve().await })
    }

    /// Mint new records held by the given parties, issued by this node.
    pub async fn issue(&self, holdings: Vec<(PartyId, i64)>) -> Result<FinalizedTransition, LedgerError> {
        self.coordinator.commit_issue(IssueIntent { issuer: self.party_id().clone(), holdings }).await
    }

    /// Transfer the referenced records into the given output shape.
    pub async fn move_records(
        &self,
        inputs: &[RecordRef],
        outputs: Vec<OwnershipRecord>,
    ) -> Result<FinalizedTransition, LedgerError> {
        let inputs = self.resolve_inputs(inputs)?;
        self.coordinator.commit_move(MoveIntent { inputs, outputs }).await
    }

    /// Retire the referenced records.
    pub async fn redeem(&self, inputs: &[RecordRef]) -> Result<FinalizedTransition, LedgerError> {
        let inputs = self.resolve_inputs(inputs)?;
        self.coordinator.commit_redeem(RedeemIntent { inputs }).await
    }

    /// Unspent records this party currently holds.
    pub fn holdings(&self) -> Result<Vec<StoredRecord>, LedgerError> {
        self.store.query(&RecordFilter::by_holder(self.party_id().clone()))
    }

    /// Per-issuer balances over this party's holdings.
    pub fn balances(&self) -> Result<IssuerSums, LedgerError> {
        let holdings = self.holdings()?;
        sum_by_issuer(holdings.iter().map(|entry| &entry.record))
    }

    fn resolve_inputs(&self, references: &[RecordRef]) -> Result<Vec<StoredRecord>, LedgerError> {
        references
            .iter()
            .map(|reference| {
                self.store
                    .get_unspent(reference)?
                    .ok_or_else(|| LedgerError::RecordMissing { reference: reference.to_string() })
            })
            .collect()
    }
}
