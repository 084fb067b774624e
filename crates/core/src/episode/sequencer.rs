//! Deterministic episode sequencer.

use super::types::{CategoryTree, EpisodeDescriptor};

/// Compute the episode that follows `previous` in the category walk.
///
/// With no previous episode the sequence starts at the first
/// sub-category of the first main category, episode 1. Otherwise the
/// episode number increments by one and the sub-category advances,
/// rolling over to the next main category (and from the last main
/// category back to the first) when a group is exhausted.
///
/// Pure function of the tree and the previous descriptor: calling it
/// twice with the same input yields the same output, which is what
/// lets a retry re-derive the in-flight episode without consuming it.
///
/// A previous descriptor that no longer matches the tree (categories
/// were edited) restarts the walk at the first sub-category of its
/// main category, or at the start of the tree when the main category
/// itself is gone. The episode number still increments.
pub fn next_episode(tree: &CategoryTree, previous: Option<&EpisodeDescriptor>) -> EpisodeDescriptor {
    let Some(previous) = previous else {
        let (main, sub) = tree.first();
        return EpisodeDescriptor::new(main, sub, 1);
    };

    let episode = previous.episode + 1;

    let Some(group_idx) = tree.group_index(&previous.main_category) else {
        let (main, sub) = tree.first();
        return EpisodeDescriptor::new(main, sub, episode);
    };

    let group = &tree.groups()[group_idx];
    let sub_idx = group
        .sub_categories
        .iter()
        .position(|s| s == &previous.sub_category);

    match sub_idx {
        Some(idx) if idx + 1 < group.sub_categories.len() => {
            EpisodeDescriptor::new(&group.name, &group.sub_categories[idx + 1], episode)
        }
        Some(_) => {
            // Last sub-category of the group: move to the next main
            // category, wrapping at the end of the tree.
            let next_group = &tree.groups()[(group_idx + 1) % tree.groups().len()];
            EpisodeDescriptor::new(&next_group.name, &next_group.sub_categories[0], episode)
        }
        None => EpisodeDescriptor::new(&group.name, &group.sub_categories[0], episode),
    }
}
