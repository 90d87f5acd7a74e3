//! End-to-end commit protocol tests over the in-process transport and notary.

mod common;

mod config_loading;
mod move_flow;
mod notary_conflicts;
mod redeem_flow;
mod transport_mock;
