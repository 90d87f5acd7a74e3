use super::common::{build_network, holding_triples, settle, spawn_responders};
use tally_core::domain::{MoveIntent, Operation, OwnershipRecord, ProposedTransition, RecordRef};
use tally_core::foundation::{LedgerError, PartyId};

#[tokio::test]
async fn sole_holder_moves_without_soliciting_signatures() {
    let net = build_network(&["issuer", "holder1", "holder2"]);
    spawn_responders(&net, &["holder1", "holder2"]).await;

    let issuer = net.node("issuer");
    issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;

    // holder1 splits its 10 into 4 for itself and 6 for holder2. It is the
    // only consuming holder, so no countersignature round is needed.
    let holder1 = net.node("holder1");
    let inputs: Vec<_> = holder1.holdings().expect("holdings").iter().map(|entry| entry.reference).collect();
    holder1
        .move_records(
            &inputs,
            vec![OwnershipRecord::new("issuer", "holder1", 4), OwnershipRecord::new("issuer", "holder2", 6)],
        )
        .await
        .expect("move");
    settle().await;

    assert_eq!(holder1.balances().expect("balances").get(&PartyId::from("issuer")), Some(4));
    let holder2 = net.node("holder2");
    assert_eq!(holder2.balances().expect("balances").get(&PartyId::from("issuer")), Some(6));

    // Per-issuer value is conserved across the two views.
    let total: i64 = [holder1, holder2]
        .iter()
        .map(|node| node.balances().expect("balances").get(&PartyId::from("issuer")).unwrap_or(0))
        .sum();
    assert_eq!(total, 10);
}

#[tokio::test]
async fn moving_another_holders_record_requires_its_countersignature() {
    let net = build_network(&["issuer", "holder1", "holder2"]);
    spawn_responders(&net, &["holder1", "holder2"]).await;

    let issuer = net.node("issuer");
    issuer
        .issue(vec![(PartyId::from("holder1"), 10), (PartyId::from("holder2"), 20)])
        .await
        .expect("issue");
    settle().await;

    // holder1 consumes both records; holder2 must countersign remotely. The
    // issue fan-out put holder2's record into holder1's ledger view too.
    let holder1 = net.node("holder1");
    let inputs: Vec<RecordRef> = holder1
        .holdings()
        .expect("holdings")
        .iter()
        .chain(net.node("holder2").holdings().expect("holdings").iter())
        .map(|entry| entry.reference)
        .collect();
    let finalized = holder1
        .move_records(&inputs, vec![OwnershipRecord::new("issuer", "holder1", 30)])
        .await
        .expect("move");
    settle().await;

    let signers: Vec<String> = finalized.signer_set().iter().map(|party| party.as_str().to_string()).collect();
    assert_eq!(signers, vec!["holder1".to_string(), "holder2".to_string()]);

    assert_eq!(
        holding_triples(&holder1.holdings().expect("holdings")),
        vec![("issuer".to_string(), "holder1".to_string(), 30)]
    );
    assert!(net.node("holder2").holdings().expect("holdings").is_empty());
}

#[tokio::test]
async fn coordinator_must_hold_a_consumed_record() {
    let net = build_network(&["issuer", "holder1", "holder2"]);
    spawn_responders(&net, &["holder1", "holder2"]).await;

    let issuer = net.node("issuer");
    issuer
        .issue(vec![(PartyId::from("holder1"), 5), (PartyId::from("holder2"), 10)])
        .await
        .expect("issue");
    settle().await;

    // holder1 tries to coordinate a move that consumes only holder2's
    // record. It has no stake in that transition and is stopped locally.
    let holder1 = net.node("holder1");
    let inputs: Vec<RecordRef> =
        net.node("holder2").holdings().expect("holdings").iter().map(|entry| entry.reference).collect();
    let err = holder1
        .move_records(&inputs, vec![OwnershipRecord::new("issuer", "holder1", 10)])
        .await
        .expect_err("not a holder");
    assert!(matches!(err, LedgerError::Irrelevant { ref party } if party.as_str() == "holder1"));
}

#[tokio::test]
async fn solicited_signer_with_no_stake_declines_and_the_move_aborts() {
    let net = build_network(&["issuer", "holder1", "holder2"]);
    spawn_responders(&net, &["holder1", "holder2"]).await;

    let issuer = net.node("issuer");
    issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;

    // Hand-build a proposal naming holder2 as an extra required signer even
    // though it holds none of the consumed inputs. holder2 must refuse.
    let holder1 = net.node("holder1");
    let inputs = holder1.holdings().expect("holdings");
    let mut transition = MoveIntent { inputs, outputs: vec![OwnershipRecord::new("issuer", "holder1", 10)] }
        .assemble()
        .expect("assemble");
    transition.signers.insert(PartyId::from("holder2"));

    let err = holder1.coordinator().commit(transition).await.expect_err("declined");
    assert!(matches!(err, LedgerError::SignerMissing { ref party } if party.as_str() == "holder2"));

    // Nothing was consumed: holder1 still holds its record.
    assert_eq!(holder1.balances().expect("balances").get(&PartyId::from("issuer")), Some(10));
}

#[tokio::test]
async fn unreachable_signer_aborts_the_whole_move() {
    let net = build_network(&["issuer", "holder1", "holder2"]);
    // holder2 never starts a responder.
    spawn_responders(&net, &["holder1"]).await;

    let issuer = net.node("issuer");
    let issued = issuer
        .issue(vec![(PartyId::from("holder1"), 10), (PartyId::from("holder2"), 20)])
        .await
        .expect("issue");
    settle().await;

    // holder2's record never reached it, but the references are well known
    // from the issue transition itself.
    let issued_id = issued.id().expect("id");
    let inputs = [RecordRef::new(issued_id, 0), RecordRef::new(issued_id, 1)];

    let holder1 = net.node("holder1");
    let err = holder1
        .move_records(&inputs, vec![OwnershipRecord::new("issuer", "holder1", 30)])
        .await
        .expect_err("peer offline");
    assert!(matches!(err, LedgerError::PeerUnreachable { ref party, .. } if party.as_str() == "holder2"));

    // No partial application: holder1's record is still spendable.
    assert_eq!(holder1.balances().expect("balances").get(&PartyId::from("issuer")), Some(10));
    holder1
        .move_records(&[RecordRef::new(issued_id, 0)], vec![OwnershipRecord::new("issuer", "holder1", 10)])
        .await
        .expect("own record still unspent");
}

#[tokio::test]
async fn unbalanced_proposal_never_leaves_the_coordinator() {
    let net = build_network(&["issuer", "holder1"]);
    spawn_responders(&net, &["holder1"]).await;

    let issuer = net.node("issuer");
    issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;

    let holder1 = net.node("holder1");
    let inputs = holder1.holdings().expect("holdings");
    let transition = ProposedTransition {
        operation: Operation::Move,
        inputs,
        outputs: vec![OwnershipRecord::new("issuer", "holder1", 9)],
        signers: [PartyId::from("holder1")].into_iter().collect(),
    };
    let err = holder1.coordinator().commit(transition).await.expect_err("unbalanced");
    assert!(matches!(err, LedgerError::ConservationViolation { .. }));
}
