use super::common::{build_network, settle, spawn_responders};
use tally_core::domain::{RecordRef, RedeemIntent};
use tally_core::foundation::{LedgerError, PartyId};

#[tokio::test]
async fn holder_redeems_with_issuer_countersignature() {
    let net = build_network(&["issuer", "holder1"]);
    spawn_responders(&net, &["issuer", "holder1"]).await;

    let issuer = net.node("issuer");
    issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;

    let holder1 = net.node("holder1");
    let inputs: Vec<RecordRef> = holder1.holdings().expect("holdings").iter().map(|entry| entry.reference).collect();
    let finalized = holder1.redeem(&inputs).await.expect("redeem");
    settle().await;

    // Both the issuer and the holder authorized the destruction.
    let signers: Vec<String> = finalized.signer_set().iter().map(|party| party.as_str().to_string()).collect();
    assert_eq!(signers, vec!["holder1".to_string(), "issuer".to_string()]);
    assert!(finalized.transition.outputs.is_empty());

    // The records are gone from every stakeholder's view.
    assert!(holder1.holdings().expect("holdings").is_empty());
    assert!(holder1.balances().expect("balances").is_empty());
}

#[tokio::test]
async fn issuer_can_coordinate_the_redeem_of_its_own_records() {
    let net = build_network(&["issuer", "holder1"]);
    spawn_responders(&net, &["issuer", "holder1"]).await;

    let issuer = net.node("issuer");
    issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;

    // The issuer is a required signer of the redeem, so it may coordinate;
    // holder1 countersigns remotely.
    let holder1 = net.node("holder1");
    let inputs: Vec<RecordRef> = holder1.holdings().expect("holdings").iter().map(|entry| entry.reference).collect();
    issuer.redeem(&inputs).await.expect("redeem");
    settle().await;

    assert!(holder1.holdings().expect("holdings").is_empty());
}

#[tokio::test]
async fn redeem_aborts_when_the_issuer_is_unreachable() {
    let net = build_network(&["issuer", "holder1"]);
    // Only the holder is online; the issuer must countersign but cannot.
    spawn_responders(&net, &["holder1"]).await;

    let issuer = net.node("issuer");
    let issued = issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;

    let holder1 = net.node("holder1");
    let inputs = [RecordRef::new(issued.id().expect("id"), 0)];
    let err = holder1.redeem(&inputs).await.expect_err("issuer offline");
    assert!(matches!(err, LedgerError::PeerUnreachable { ref party, .. } if party.as_str() == "issuer"));

    // The record survived the aborted attempt.
    assert_eq!(holder1.balances().expect("balances").get(&PartyId::from("issuer")), Some(10));
}

#[tokio::test]
async fn redeem_without_the_issuer_signature_is_rejected_locally() {
    let net = build_network(&["issuer", "holder1"]);
    spawn_responders(&net, &["issuer", "holder1"]).await;

    let issuer = net.node("issuer");
    issuer.issue(vec![(PartyId::from("holder1"), 10)]).await.expect("issue");
    settle().await;

    // Strip the issuer from the required signer set; the validator rejects
    // the proposal before any peer contact.
    let holder1 = net.node("holder1");
    let mut transition = RedeemIntent { inputs: holder1.holdings().expect("holdings") }.assemble().expect("assemble");
    transition.signers.remove(&PartyId::from("issuer"));

    let err = holder1.coordinator().commit(transition).await.expect_err("issuer absent");
    assert!(matches!(err, LedgerError::SignerMissing { ref party } if party.as_str() == "issuer"));
}
