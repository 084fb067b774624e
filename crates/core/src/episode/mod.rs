//! Episode identity and sequencing.
//!
//! An episode is the unit of daily production, identified by a
//! (main category, sub-category, episode number) triple. The sequencer
//! walks the category tree deterministically: one sub-category per
//! episode, wrapping to the next main category when a group is
//! exhausted and back to the first group at the end of the tree.

mod sequencer;
mod types;

pub use sequencer::next_episode;
pub use types::{CategoryGroup, CategoryTree, CategoryTreeError, EpisodeDescriptor};
