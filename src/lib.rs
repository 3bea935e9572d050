//! Staking and reward statistics for Marlin relay operators.
//!
//! Data is pulled from the staking REST API and the network subgraph, joined
//! per operator address, then sorted and rendered in one pass.

pub mod client;
pub mod config;
pub mod model;
pub mod monitor;
pub mod prelude;
pub mod reconcile;
pub mod render;
pub mod resolver;
pub mod sort;
pub mod units;
