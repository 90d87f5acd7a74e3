use std::sync::Arc;
use tally_core::domain::{OwnershipRecord, ProposedTransition, TransactionRole};
use tally_core::foundation::{LedgerError, PartyId, SessionId};
use tally_core::infrastructure::transport::mock::{MockHub, MockTransport};
use tally_core::infrastructure::transport::{ProtocolMessage, RoleAssign, SignatureRequest, Transport};

fn sample_request() -> SignatureRequest {
    let transition = ProposedTransition {
        operation: tally_core::domain::Operation::Issue,
        inputs: Vec::new(),
        outputs: vec![OwnershipRecord::new("alice", "bob", 1)],
        signers: [PartyId::from("alice")].into_iter().collect(),
    };
    SignatureRequest { transition_id: transition.id().expect("id"), transition, coordinator: PartyId::from("alice") }
}

#[tokio::test]
async fn subscriber_receives_addressed_messages_in_order() {
    let hub = Arc::new(MockHub::new());
    let alice = MockTransport::new(hub.clone(), PartyId::from("alice"));
    let session_id = SessionId::new([1u8; 32]);

    let mut inbox = alice.subscribe(&PartyId::from("bob")).await.expect("subscribe");

    let role = RoleAssign { role: TransactionRole::Signer, coordinator: PartyId::from("alice") };
    alice.send_role(&PartyId::from("bob"), session_id, role).await.expect("send role");
    alice.send_signature_request(&PartyId::from("bob"), session_id, sample_request()).await.expect("send request");

    let first = inbox.next().await.expect("first").expect("envelope");
    assert_eq!(first.sender.as_str(), "alice");
    assert_eq!(first.recipient.as_str(), "bob");
    assert_eq!(first.session_id, session_id);
    assert!(matches!(first.payload, ProtocolMessage::RoleAssign(_)));

    let second = inbox.next().await.expect("second").expect("envelope");
    assert!(matches!(second.payload, ProtocolMessage::SignatureRequest(_)));
    assert!(second.seq_no > first.seq_no);
}

#[tokio::test]
async fn sending_to_a_party_with_no_subscription_is_unreachable() {
    let hub = Arc::new(MockHub::new());
    let alice = MockTransport::new(hub, PartyId::from("alice"));
    let session_id = SessionId::new([2u8; 32]);

    let role = RoleAssign { role: TransactionRole::Participant, coordinator: PartyId::from("alice") };
    let err = alice.send_role(&PartyId::from("ghost"), session_id, role).await.expect_err("no subscriber");
    assert!(matches!(err, LedgerError::PeerUnreachable { ref party, .. } if party.as_str() == "ghost"));
}

#[tokio::test]
async fn inboxes_are_isolated_per_party() {
    let hub = Arc::new(MockHub::new());
    let alice = MockTransport::new(hub.clone(), PartyId::from("alice"));
    let session_id = SessionId::new([3u8; 32]);

    let mut bob_inbox = alice.subscribe(&PartyId::from("bob")).await.expect("subscribe bob");
    let mut carly_inbox = alice.subscribe(&PartyId::from("carly")).await.expect("subscribe carly");

    let role = RoleAssign { role: TransactionRole::Signer, coordinator: PartyId::from("alice") };
    alice.send_role(&PartyId::from("bob"), session_id, role).await.expect("send");

    let envelope = bob_inbox.next().await.expect("bob gets it").expect("envelope");
    assert_eq!(envelope.recipient.as_str(), "bob");

    // carly's inbox stays quiet.
    let quiet = tokio::time::timeout(std::time::Duration::from_millis(50), carly_inbox.next()).await;
    assert!(quiet.is_err());
}
