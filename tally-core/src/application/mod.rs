//! Application layer: the commit protocol roles and the caller surface.

pub mod coordinator;
pub mod lifecycle;
pub mod node;
pub mod participant;

pub use coordinator::{CommitSettings, Coordinator};
pub use lifecycle::{LifecycleObserver, NoopObserver};
pub use node::PartyNode;
pub use participant::Participant;
