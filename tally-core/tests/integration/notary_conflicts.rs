use super::common::{build_network, settle, spawn_responders};
use tally_core::domain::{OwnershipRecord, RecordRef};
use tally_core::foundation::{LedgerError, PartyId};
use tally_core::infrastructure::notary::Notary;

#[tokio::test]
async fn a_spent_record_cannot_be_spent_again() {
    let net = build_network(&["issuer", "holder1", "holder2", "holder3"]);
    spawn_responders(&net, &["holder1", "holder2", "holder3"]).await;

    let issuer = net.node("issuer");
    let issued = issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;
    let reference = RecordRef::new(issued.id().expect("id"), 0);

    let holder1 = net.node("holder1");
    holder1
        .move_records(&[reference], vec![OwnershipRecord::new("issuer", "holder2", 10)])
        .await
        .expect("first spend");
    settle().await;

    // holder1's store already dropped the record, so a second attempt through
    // the caller surface dies with a missing record.
    let err = holder1
        .move_records(&[reference], vec![OwnershipRecord::new("issuer", "holder3", 10)])
        .await
        .expect_err("already spent locally");
    assert!(matches!(err, LedgerError::RecordMissing { .. }));
}

#[tokio::test]
async fn notary_rejects_conflicting_consumption_from_a_stale_view() {
    let net = build_network(&["issuer", "holder1", "holder2", "holder3"]);
    spawn_responders(&net, &["holder1", "holder2", "holder3"]).await;

    let issuer = net.node("issuer");
    issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;

    // Capture the input before spending it, simulating a coordinator whose
    // view of unspent records has gone stale.
    let holder1 = net.node("holder1");
    let stale_inputs = holder1.holdings().expect("holdings");
    let references: Vec<RecordRef> = stale_inputs.iter().map(|entry| entry.reference).collect();

    holder1
        .move_records(&references, vec![OwnershipRecord::new("issuer", "holder2", 10)])
        .await
        .expect("first spend");
    settle().await;

    // Resubmitting a conflicting transition straight through the coordinator
    // bypasses the local store and reaches the notary, which must refuse it.
    let transition = tally_core::domain::MoveIntent {
        inputs: stale_inputs,
        outputs: vec![OwnershipRecord::new("issuer", "holder3", 10)],
    }
    .assemble()
    .expect("assemble");
    let err = holder1.coordinator().commit(transition).await.expect_err("double spend");
    assert!(matches!(err, LedgerError::NotarizationRejected { .. }));

    // The first spend stands: holder2 has the value, holder3 has nothing.
    assert_eq!(net.node("holder2").balances().expect("balances").get(&PartyId::from("issuer")), Some(10));
    assert!(net.node("holder3").holdings().expect("holdings").is_empty());
}

#[tokio::test]
async fn resubmitting_a_finalized_transition_is_a_conflict() {
    let net = build_network(&["issuer", "holder1"]);
    spawn_responders(&net, &["holder1"]).await;

    let issuer = net.node("issuer");
    let issued = issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;

    // Replay the exact signed transition at the notary: it must be observably
    // rejected as a conflict, not silently accepted a second time.
    let replay = tally_core::domain::SignedTransition {
        transition: issued.transition.clone(),
        signatures: issued.signatures.clone(),
    };
    let err = net.notary.submit(replay).await.expect_err("replay");
    assert!(matches!(err, LedgerError::NotarizationRejected { .. }));
}
