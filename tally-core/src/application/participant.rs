use crate::application::coordinator::CommitSettings;
use crate::application::lifecycle::{LifecycleObserver, NoopObserver};
use crate::domain::commit::{ParticipantPhase, ParticipantRun};
use crate::domain::conservation::verify_transition;
use crate::domain::transition::{FinalizedTransition, Operation, PartySignature, ProposedTransition};
use crate::foundation::{LedgerError, PartyId, SessionId};
use crate::infrastructure::identity::{verify_full_authorization, Ed25519Identity, IdentityResolver};
use crate::infrastructure::store::RecordStore;
use crate::infrastructure::transport::{MessageEnvelope, ProtocolMessage, SignatureRequest, SignatureReply, Transport};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// The responder role: serves this party's inbox, countersigning proposals
/// it has a stake in and recording finalized transitions it is told about.
pub struct Participant {
    identity: Ed25519Identity,
    resolver: Arc<dyn IdentityResolver>,
    transport: Arc<dyn Transport>,
    store: Arc<dyn RecordStore>,
    lifecycle: Arc<dyn LifecycleObserver>,
    settings: CommitSettings,
}

impl Participant {
    pub fn new(
        identity: Ed25519Identity,
        resolver: Arc<dyn IdentityResolver>,
        transport: Arc<dyn Transport>,
        store: Arc<dyn RecordStore>,
        settings: CommitSettings,
    ) -> Self {
        Self { identity, resolver, transport, store, lifecycle: Arc::new(NoopObserver), settings }
    }

    pub fn set_lifecycle_observer(&mut self, observer: Arc<dyn LifecycleObserver>) {
        self.lifecycle = observer;
    }

    pub fn party_id(&self) -> &PartyId {
        self.identity.party_id()
    }

    /// Serve the inbox until the transport closes it. One [`ParticipantRun`]
    /// exists per in-flight session; a handling failure is logged and the
    /// loop keeps serving other sessions.
    pub async fn serve(&self) -> Result<(), LedgerError> {
        let local = self.identity.party_id().clone();
        let mut inbox = self.transport.subscribe(&local).await?;
        let mut runs: HashMap<SessionId, ParticipantRun> = HashMap::new();
        info!("participant serving party={}", local);
        while let Some(message) = inbox.next().await {
            let envelope = match message {
                Ok(envelope) => envelope,
                Err(err) => {
                    warn!("inbox error party={} error={}", local, err);
                    continue;
                }
            };
            if envelope.recipient != local {
                continue;
            }
            if let Err(err) = self.handle_envelope(&mut runs, envelope).await {
                warn!("envelope handling failed party={} error={}", local, err);
            }
            runs.retain(|_, run| !run.is_done());
        }
        Ok(())
    }

    async fn handle_envelope(
        &self,
        runs: &mut HashMap<SessionId, ParticipantRun>,
        envelope: MessageEnvelope,
    ) -> Result<(), LedgerError> {
        let session_id = envelope.session_id;
        match envelope.payload {
            ProtocolMessage::RoleAssign(assign) => {
                debug!(
                    "role assigned party={} session_id={} role={} coordinator={}",
                    self.party_id(),
                    session_id,
                    assign.role,
                    assign.coordinator
                );
                let run = runs.entry(session_id).or_insert_with(|| ParticipantRun::new(session_id));
                run.assign_role(assign.role)
            }
            ProtocolMessage::SignatureRequest(request) => {
                let run = runs.get_mut(&session_id).ok_or_else(|| LedgerError::TransportError {
                    operation: "signature_request".to_string(),
                    details: format!("no role assigned for session {}", session_id),
                })?;
                if run.phase() != &ParticipantPhase::Signing {
                    return Err(LedgerError::InvalidStateTransition {
                        from: format!("{:?}", run.phase()),
                        to: "Signing".to_string(),
                    });
                }
                let reply = self.evaluate_request(&request);
                let accepted = reply.accept;
                self.transport.send_signature_reply(&request.coordinator, session_id, reply).await?;
                if accepted {
                    run.transition = Some(request.transition);
                    run.advance(ParticipantPhase::AwaitingFinality)
                } else {
                    run.advance(ParticipantPhase::Done)
                }
            }
            ProtocolMessage::FinalizedNotice(notice) => {
                let run = runs.get_mut(&session_id).ok_or_else(|| LedgerError::TransportError {
                    operation: "finalized_notice".to_string(),
                    details: format!("no role assigned for session {}", session_id),
                })?;
                self.accept_finalized(&notice.finalized)?;
                run.advance(ParticipantPhase::Done)
            }
            ProtocolMessage::AbortNotice(notice) => {
                info!(
                    "session aborted party={} session_id={} transition_id={} reason={}",
                    self.party_id(),
                    session_id,
                    notice.transition_id,
                    notice.reason
                );
                if let Some(run) = runs.get_mut(&session_id) {
                    run.advance(ParticipantPhase::Done)?;
                }
                Ok(())
            }
            // Replies are coordinator-bound; a party acting as coordinator
            // shares this inbox, so they are not an error here.
            ProtocolMessage::SignatureReply(_) => Ok(()),
        }
    }

    fn evaluate_request(&self, request: &SignatureRequest) -> SignatureReply {
        let local = self.identity.party_id().clone();
        match self.validate_request(request) {
            Ok(signature) => SignatureReply {
                transition_id: request.transition_id,
                signer: local,
                accept: true,
                reason: None,
                signature: Some(signature.signature),
            },
            Err(err) => {
                warn!(
                    "refusing to countersign party={} transition_id={} reason={}",
                    local, request.transition_id, err
                );
                SignatureReply {
                    transition_id: request.transition_id,
                    signer: local,
                    accept: false,
                    reason: Some(err.to_string()),
                    signature: None,
                }
            }
        }
    }

    fn validate_request(&self, request: &SignatureRequest) -> Result<PartySignature, LedgerError> {
        let local = self.identity.party_id();
        let computed = request.transition.id()?;
        if !computed.ct_eq(&request.transition_id) {
            return Err(LedgerError::Message(format!(
                "claimed transition id {} does not match computed {}",
                request.transition_id, computed
            )));
        }
        // Never trust the coordinator's pre-check.
        verify_transition(&request.transition)?;
        if !request.transition.signers.contains(local) {
            return Err(LedgerError::Irrelevant { party: local.clone() });
        }
        if !self.is_relevant(&request.transition) {
            return Err(LedgerError::Irrelevant { party: local.clone() });
        }
        Ok(self.identity.sign_transition(&request.transition_id))
    }

    /// A party may only endorse a transition it has a stake in: it must hold
    /// a consumed input (for Redeem, issuing one also counts; for a
    /// multi-issuer Issue, it must issue one of the produced records).
    /// Without this check a coordinator could trick a party into endorsing a
    /// transfer between third parties.
    fn is_relevant(&self, transition: &ProposedTransition) -> bool {
        let local = self.identity.party_id();
        match transition.operation {
            Operation::Issue => transition.outputs.iter().any(|record| &record.issuer == local),
            Operation::Move => transition.input_records().any(|record| &record.holder == local),
            Operation::Redeem => {
                transition.input_records().any(|record| &record.holder == local || &record.issuer == local)
            }
        }
    }

    /// Final admission of a notarized transition into the local view.
    fn accept_finalized(&self, finalized: &FinalizedTransition) -> Result<(), LedgerError> {
        if finalized.stamp.notary != self.settings.notary_party {
            return Err(LedgerError::NotarizationRejected {
                reason: format!("stamp from unexpected notary {}", finalized.stamp.notary),
            });
        }
        verify_transition(&finalized.transition)?;
        verify_full_authorization(self.resolver.as_ref(), &finalized.transition, &finalized.signatures)?;
        self.store.persist_finalized(finalized)?;
        self.lifecycle.on_finalized(&finalized.id()?, finalized.stamp.sequence);
        Ok(())
    }
}
