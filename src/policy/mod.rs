//! Policies used by the Monte Carlo player
//!
//! - Rollout policies: where simulated cards are placed during a rollout

pub mod rollout;

pub use rollout::{GreedyPolicy, RandomPolicy, RolloutPolicy};
