// Analyzer module: statistics over inspection history and the regional subset.

pub mod infractions;
pub mod region;

pub use infractions::compute_infraction_stats;
pub use region::{rank_by_recent_infractions, select_subset, select_subset_mut};
