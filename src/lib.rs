//! # Escrow Relay
//!
//! Library for the implementation of the escrow relay: a custodial
//! coordinator standing in for an on-chain HTLC on ledgers whose native
//! scripting cannot express multi-phase timelock semantics.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod escrow;
pub mod ledger;
pub mod metrics;
pub mod rpc;
pub mod serde;
pub mod spawn;
pub mod storage;
pub mod types;
pub mod version;
pub mod wallet;
