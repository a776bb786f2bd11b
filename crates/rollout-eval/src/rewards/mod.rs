//! Reference reward functions

mod exact_match;

pub use exact_match::ExactMatchReward;
