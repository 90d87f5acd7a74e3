use crate::application::lifecycle::{LifecycleObserver, NoopObserver};
use crate::domain::assemble::{IssueIntent, MoveIntent, RedeemIntent};
use crate::domain::commit::{CommitPhase, CommitRun, TransactionRole};
use crate::domain::conservation::verify_transition;
use crate::domain::signers::{distinct_parties, PartyRole};
use crate::domain::transition::{FinalizedTransition, PartySignature, ProposedTransition};
use crate::foundation::util::time::now_nanos;
use crate::foundation::{LedgerError, PartyId, SessionId};
use crate::infrastructure::config::types::NodeConfig;
use crate::infrastructure::identity::{verify_party_signature, Ed25519Identity, IdentityResolver};
use crate::infrastructure::notary::Notary;
use crate::infrastructure::store::RecordStore;
use crate::infrastructure::transport::{
    AbortNotice, FinalizedNotice, ProtocolMessage, RoleAssign, SignatureRequest, Transport, TransportSubscription,
};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fixed per-node protocol settings.
///
/// The notarizing authority is a configuration value, never discovered at
/// run time.
#[derive(Clone, Debug)]
pub struct CommitSettings {
    pub notary_party: PartyId,
    /// How long the signature-collection barrier waits before treating the
    /// slowest signer as unreachable.
    pub session_timeout: Duration,
}

impl CommitSettings {
    pub fn from_config(config: &NodeConfig) -> Self {
        Self {
            notary_party: PartyId::from(config.notary.as_str()),
            session_timeout: Duration::from_secs(config.session_timeout_seconds),
        }
    }
}

/// The initiator role: drives one proposal from intent to notarized finality.
///
/// Each `commit_*` call is an independent, long-lived conversation; the only
/// state carried across its suspension points lives in the [`CommitRun`].
pub struct Coordinator {
    identity: Ed25519Identity,
    resolver: Arc<dyn IdentityResolver>,
    transport: Arc<dyn Transport>,
    notary: Arc<dyn Notary>,
    store: Arc<dyn RecordStore>,
    lifecycle: Arc<dyn LifecycleObserver>,
    settings: CommitSettings,
}

impl Coordinator {
    pub fn new(
        identity: Ed25519Identity,
        resolver: Arc<dyn IdentityResolver>,
        transport: Arc<dyn Transport>,
        notary: Arc<dyn Notary>,
        store: Arc<dyn RecordStore>,
        settings: CommitSettings,
    ) -> Self {
        Self { identity, resolver, transport, notary, store, lifecycle: Arc::new(NoopObserver), settings }
    }

    pub fn set_lifecycle_observer(&mut self, observer: Arc<dyn LifecycleObserver>) {
        self.lifecycle = observer;
    }

    pub fn party_id(&self) -> &PartyId {
        self.identity.party_id()
    }

    pub async fn commit_issue(&self, intent: IssueIntent) -> Result<FinalizedTransition, LedgerError> {
        self.commit(intent.assemble()?).await
    }

    pub async fn commit_move(&self, intent: MoveIntent) -> Result<FinalizedTransition, LedgerError> {
        self.commit(intent.assemble()?).await
    }

    pub async fn commit_redeem(&self, intent: RedeemIntent) -> Result<FinalizedTransition, LedgerError> {
        self.commit(intent.assemble()?).await
    }

    /// Run the full protocol for an assembled proposal.
    ///
    /// Any failure aborts the whole proposal: contacted peers are notified
    /// and nothing is persisted. A rejected proposal must be re-assembled
    /// from fresh records by the caller, never resubmitted as-is.
    pub async fn commit(&self, transition: ProposedTransition) -> Result<FinalizedTransition, LedgerError> {
        let session_id = self.new_session_id(&transition)?;
        let mut run = CommitRun::new(session_id, transition)?;
        let mut contacted: Vec<PartyId> = Vec::new();
        match self.drive(&mut run, &mut contacted).await {
            Ok(finalized) => {
                run.advance(CommitPhase::Done)?;
                Ok(finalized)
            }
            Err(err) => {
                self.lifecycle.on_aborted(&run.transition_id, &err.to_string());
                let notice = AbortNotice { transition_id: run.transition_id, reason: err.to_string() };
                for party in &contacted {
                    if let Err(send_err) = self.transport.send_abort(party, run.session_id, notice.clone()).await {
                        debug!("abort notice undeliverable party={} error={}", party, send_err);
                    }
                }
                if let Err(abort_err) = run.abort(err.to_string()) {
                    warn!("abort bookkeeping failed transition_id={} error={}", run.transition_id, abort_err);
                }
                Err(err)
            }
        }
    }

    async fn drive(&self, run: &mut CommitRun, contacted: &mut Vec<PartyId>) -> Result<FinalizedTransition, LedgerError> {
        let local = self.identity.party_id().clone();

        run.advance(CommitPhase::LocallyValidating)?;
        // Fail fast before any network round trip on a doomed proposal.
        verify_transition(&run.transition)?;
        if !run.transition.signers.contains(&local) {
            return Err(LedgerError::Irrelevant { party: local });
        }
        self.lifecycle.on_proposed(&run.transition_id, run.transition.operation);

        run.advance(CommitPhase::Signing)?;
        run.add_signature(self.identity.sign_transition(&run.transition_id))?;

        run.advance(CommitPhase::CollectingSignatures)?;
        let remote = run.outstanding_signers();
        if !remote.is_empty() {
            // Subscribe before soliciting so no reply can slip past us.
            let mut inbox = self.transport.subscribe(&local).await?;
            for party in &remote {
                let role = RoleAssign { role: TransactionRole::Signer, coordinator: local.clone() };
                self.transport.send_role(party, run.session_id, role).await?;
                let request = SignatureRequest {
                    transition_id: run.transition_id,
                    transition: run.transition.clone(),
                    coordinator: local.clone(),
                };
                self.transport.send_signature_request(party, run.session_id, request).await?;
                contacted.push(party.clone());
                debug!("signature solicited session_id={} transition_id={} party={}", run.session_id, run.transition_id, party);
            }
            self.collect_signatures(run, &mut inbox).await?;
        }

        run.advance(CommitPhase::Finalizing)?;
        let signed = run.clone().into_signed()?;
        let finalized = self.notary.submit(signed).await?;
        if finalized.stamp.notary != self.settings.notary_party {
            return Err(LedgerError::NotarizationRejected {
                reason: format!("stamp from unexpected notary {}", finalized.stamp.notary),
            });
        }
        info!(
            "transition finalized transition_id={} operation={} sequence={}",
            run.transition_id, run.transition.operation, finalized.stamp.sequence
        );
        self.lifecycle.on_finalized(&run.transition_id, finalized.stamp.sequence);

        self.distribute(run, &finalized).await;
        self.store.persist_finalized(&finalized)?;
        Ok(finalized)
    }

    /// Barrier: wait until every required signer has replied.
    ///
    /// Sessions to different peers are independent and outstanding
    /// concurrently; replies are accepted in whatever order they arrive. A
    /// decline abandons the proposal immediately, and a silent peer turns
    /// into `PeerUnreachable` at the deadline.
    async fn collect_signatures(&self, run: &mut CommitRun, inbox: &mut TransportSubscription) -> Result<(), LedgerError> {
        let deadline = Instant::now() + self.settings.session_timeout;
        while !run.is_fully_signed() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                let pending = run.outstanding_signers();
                let party = pending
                    .into_iter()
                    .next()
                    .ok_or_else(|| LedgerError::Message("collection barrier ran with no outstanding signers".to_string()))?;
                return Err(LedgerError::PeerUnreachable {
                    party,
                    details: format!("no signature reply within {:?}", self.settings.session_timeout),
                });
            }

            match tokio::time::timeout(remaining, inbox.next()).await {
                Ok(Some(Ok(envelope))) => {
                    if envelope.session_id != run.session_id {
                        continue;
                    }
                    let ProtocolMessage::SignatureReply(reply) = envelope.payload else {
                        continue;
                    };
                    if reply.transition_id != run.transition_id {
                        continue;
                    }
                    if !reply.accept {
                        let reason = reply.reason.unwrap_or_else(|| "declined".to_string());
                        warn!(
                            "signer declined transition_id={} party={} reason={}",
                            run.transition_id, reply.signer, reason
                        );
                        return Err(LedgerError::SignerMissing { party: reply.signer });
                    }
                    if run.signed_parties().contains(&reply.signer) {
                        debug!("ignoring replayed reply transition_id={} party={}", run.transition_id, reply.signer);
                        continue;
                    }
                    let signature = match reply.signature {
                        Some(signature) => signature,
                        None => return Err(LedgerError::SignatureInvalid { party: reply.signer }),
                    };
                    verify_party_signature(self.resolver.as_ref(), &reply.signer, &run.transition_id, &signature)?;
                    self.lifecycle.on_signature_collected(&run.transition_id, &reply.signer);
                    run.add_signature(PartySignature { party: reply.signer, signature })?;
                }
                Ok(Some(Err(err))) => return Err(err),
                Ok(None) => {
                    return Err(LedgerError::TransportError {
                        operation: "collect_signatures".to_string(),
                        details: "inbox subscription closed".to_string(),
                    })
                }
                // Let the deadline branch produce the structured error.
                Err(_) => continue,
            }
        }
        Ok(())
    }

    /// Fan the finalized transition out to every stakeholder: all signers,
    /// plus produced-record holders that did not sign (signer role wins for
    /// parties in both sets). The transition is already irreversible, so a
    /// delivery failure here is logged, not fatal; the peer can recover the
    /// record from the store boundary later.
    async fn distribute(&self, run: &CommitRun, finalized: &FinalizedTransition) {
        let local = self.identity.party_id();
        let signers = &run.transition.signers;

        for party in signers.iter().filter(|party| *party != local) {
            let notice = FinalizedNotice { finalized: finalized.clone() };
            if let Err(err) = self.transport.send_finalized(party, run.session_id, notice).await {
                warn!("finalized notice undeliverable transition_id={} party={} error={}", run.transition_id, party, err);
            }
        }

        let holders = distinct_parties(run.transition.outputs.iter(), PartyRole::Holder);
        for holder in holders.iter().filter(|holder| !signers.contains(*holder) && *holder != local) {
            let role = RoleAssign { role: TransactionRole::Participant, coordinator: local.clone() };
            if let Err(err) = self.transport.send_role(holder, run.session_id, role).await {
                warn!("role assignment undeliverable transition_id={} party={} error={}", run.transition_id, holder, err);
                continue;
            }
            let notice = FinalizedNotice { finalized: finalized.clone() };
            if let Err(err) = self.transport.send_finalized(holder, run.session_id, notice).await {
                warn!("finalized notice undeliverable transition_id={} party={} error={}", run.transition_id, holder, err);
            }
        }
    }

    fn new_session_id(&self, transition: &ProposedTransition) -> Result<SessionId, LedgerError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"tally/session/v1");
        hasher.update(transition.id()?.as_hash());
        hasher.update(self.identity.party_id().as_str().as_bytes());
        hasher.update(&now_nanos().to_le_bytes());
        Ok(SessionId::new(*hasher.finalize().as_bytes()))
    }
}
