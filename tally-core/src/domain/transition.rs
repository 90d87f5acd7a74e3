use crate::domain::record::{OwnershipRecord, StoredRecord};
use crate::foundation::{LedgerError, PartyId, TransitionId};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Domain separator for transition id hashing.
const TRANSITION_HASH_PREFIX: &[u8] = b"tally/transition/v1";

/// The closed set of ledger operations.
///
/// Dispatch is by exhaustive match everywhere; external surfaces that carry
/// an operation as text go through [`Operation::from_str`], which maps any
/// other tag to [`LedgerError::UnknownOperation`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create new records out of nothing, authorized by their issuers.
    Issue,
    /// Consume records and produce records conserving per-issuer sums.
    Move,
    /// Destroy records, authorized by their issuers and holders.
    Redeem,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issue => write!(f, "issue"),
            Self::Move => write!(f, "move"),
            Self::Redeem => write!(f, "redeem"),
        }
    }
}

impl FromStr for Operation {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issue" => Ok(Self::Issue),
            "move" => Ok(Self::Move),
            "redeem" => Ok(Self::Redeem),
            other => Err(LedgerError::UnknownOperation { tag: other.to_string() }),
        }
    }
}

/// An unsigned state transition, constructed once per protocol run.
///
/// Once the conservation validator has accepted a proposal it is never
/// mutated again; subsequent protocol steps only accumulate signatures
/// alongside it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProposedTransition {
    pub operation: Operation,
    /// Records consumed, with the references that locate them.
    pub inputs: Vec<StoredRecord>,
    /// Records produced.
    pub outputs: Vec<OwnershipRecord>,
    /// Parties whose authorization is mandatory.
    pub signers: BTreeSet<PartyId>,
}

impl ProposedTransition {
    /// Canonical identifier: blake3 over the domain-separated fixed-int
    /// bincode encoding. Every party computes the same id for the same
    /// proposal, which is what signatures commit to.
    pub fn id(&self) -> Result<TransitionId, LedgerError> {
        let bytes = bincode::DefaultOptions::new().with_fixint_encoding().serialize(self)?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(TRANSITION_HASH_PREFIX);
        hasher.update(&bytes);
        Ok(TransitionId::new(*hasher.finalize().as_bytes()))
    }

    pub fn input_records(&self) -> impl Iterator<Item = &OwnershipRecord> {
        self.inputs.iter().map(|entry| &entry.record)
    }
}

/// One party's authorization over a transition id.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PartySignature {
    pub party: PartyId,
    /// Ed25519 signature over the transition id bytes.
    pub signature: Vec<u8>,
}

/// A transition carrying every required signature, ready for notarization.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SignedTransition {
    pub transition: ProposedTransition,
    pub signatures: Vec<PartySignature>,
}

impl SignedTransition {
    pub fn signer_set(&self) -> BTreeSet<PartyId> {
        self.signatures.iter().map(|sig| sig.party.clone()).collect()
    }
}

/// The notarizing authority's total-order stamp.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct NotaryStamp {
    pub notary: PartyId,
    /// Position in the authority's total order.
    pub sequence: u64,
    pub timestamp_nanos: u64,
}

/// A notarized, irreversible transition as distributed to every stakeholder.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FinalizedTransition {
    pub transition: ProposedTransition,
    pub signatures: Vec<PartySignature>,
    pub stamp: NotaryStamp,
}

impl FinalizedTransition {
    pub fn id(&self) -> Result<TransitionId, LedgerError> {
        self.transition.id()
    }

    pub fn signer_set(&self) -> BTreeSet<PartyId> {
        self.signatures.iter().map(|sig| sig.party.clone()).collect()
    }
}
