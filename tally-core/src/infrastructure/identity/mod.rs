//! Identity resolution and transition signing.
//!
//! Party names map to stable identifiers plus ed25519 verification keys.
//! The directory is static, built from configuration; discovery is out of
//! scope.

use crate::domain::transition::{PartySignature, ProposedTransition};
use crate::foundation::{LedgerError, PartyId, TransitionId};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use std::collections::HashMap;

/// A resolved party: stable identifier plus verification key.
#[derive(Clone, Debug)]
pub struct PartyInfo {
    pub party_id: PartyId,
    pub verify_key: VerifyingKey,
}

pub trait IdentityResolver: Send + Sync {
    /// Resolve a logical name to a party identifier and verification key.
    fn resolve(&self, name: &str) -> Result<PartyInfo, LedgerError>;

    fn verify_key(&self, party: &PartyId) -> Result<VerifyingKey, LedgerError> {
        Ok(self.resolve(party.as_str())?.verify_key)
    }
}

/// Fixed name-to-key directory, typically built from the peer list in
/// configuration.
pub struct StaticDirectory {
    keys: HashMap<PartyId, VerifyingKey>,
}

impl StaticDirectory {
    pub fn new(keys: HashMap<PartyId, VerifyingKey>) -> Self {
        Self { keys }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (PartyId, VerifyingKey)>) -> Self {
        Self { keys: entries.into_iter().collect() }
    }
}

impl IdentityResolver for StaticDirectory {
    fn resolve(&self, name: &str) -> Result<PartyInfo, LedgerError> {
        let party_id = PartyId::from(name);
        let verify_key = self
            .keys
            .get(&party_id)
            .copied()
            .ok_or_else(|| LedgerError::IdentityUnknown { party: party_id.clone() })?;
        Ok(PartyInfo { party_id, verify_key })
    }
}

/// A local party's signing identity.
#[derive(Clone)]
pub struct Ed25519Identity {
    party_id: PartyId,
    key: SigningKey,
}

impl Ed25519Identity {
    pub fn from_seed(party_id: PartyId, seed: [u8; 32]) -> Self {
        Self { party_id, key: SigningKey::from_bytes(&seed) }
    }

    pub fn party_id(&self) -> &PartyId {
        &self.party_id
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Authorize a transition by signing its id.
    pub fn sign_transition(&self, transition_id: &TransitionId) -> PartySignature {
        let signature = self.key.sign(transition_id.as_hash());
        PartySignature { party: self.party_id.clone(), signature: signature.to_bytes().to_vec() }
    }
}

/// Verify one party's signature over a transition id.
pub fn verify_party_signature(
    resolver: &dyn IdentityResolver,
    party: &PartyId,
    transition_id: &TransitionId,
    signature: &[u8],
) -> Result<(), LedgerError> {
    let key = resolver.verify_key(party)?;
    let signature =
        Signature::from_slice(signature).map_err(|_| LedgerError::SignatureInvalid { party: party.clone() })?;
    key.verify_strict(transition_id.as_hash(), &signature)
        .map_err(|_| LedgerError::SignatureInvalid { party: party.clone() })
}

/// Final admission check over a signature set: every attached signature must
/// verify, and every required signer of the transition must be present.
pub fn verify_full_authorization(
    resolver: &dyn IdentityResolver,
    transition: &ProposedTransition,
    signatures: &[PartySignature],
) -> Result<(), LedgerError> {
    let transition_id = transition.id()?;
    for sig in signatures {
        verify_party_signature(resolver, &sig.party, &transition_id, &sig.signature)?;
    }
    let signed: std::collections::BTreeSet<&PartyId> = signatures.iter().map(|sig| &sig.party).collect();
    for party in &transition.signers {
        if !signed.contains(party) {
            return Err(LedgerError::SignerMissing { party: party.clone() });
        }
    }
    Ok(())
}
