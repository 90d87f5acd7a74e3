//! Domain layer: pure ledger semantics, no I/O.

pub mod assemble;
pub mod balance;
pub mod commit;
pub mod conservation;
pub mod record;
pub mod signers;
pub mod transition;

pub use assemble::{IssueIntent, MoveIntent, RedeemIntent};
pub use balance::IssuerSums;
pub use commit::{CommitPhase, CommitRun, ParticipantPhase, ParticipantRun, TransactionRole};
pub use record::{OwnershipRecord, RecordRef, StoredRecord};
pub use transition::{FinalizedTransition, NotaryStamp, Operation, PartySignature, ProposedTransition, SignedTransition};
