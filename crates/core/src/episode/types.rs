//! Core episode data types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies one unit of daily production.
///
/// Descriptors are immutable once issued: a retry dispatch reuses the
/// descriptor of the failed attempt instead of advancing the sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeDescriptor {
    /// Main category name (must exist in the category tree).
    pub main_category: String,
    /// Sub-category name within the main category.
    pub sub_category: String,
    /// Episode number, 1-indexed and strictly increasing across the
    /// whole sequence (never resets on category rollover).
    pub episode: u32,
}

impl EpisodeDescriptor {
    /// Create a new descriptor.
    pub fn new(main: impl Into<String>, sub: impl Into<String>, episode: u32) -> Self {
        Self {
            main_category: main.into(),
            sub_category: sub.into(),
            episode,
        }
    }
}

impl std::fmt::Display for EpisodeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {} ep {}",
            self.main_category, self.sub_category, self.episode
        )
    }
}

/// Error validating a category tree.
#[derive(Debug, Error)]
pub enum CategoryTreeError {
    /// The tree has no main categories.
    #[error("category tree is empty")]
    Empty,

    /// A main category has no sub-categories.
    #[error("main category '{0}' has no sub-categories")]
    EmptyGroup(String),

    /// A main category name appears more than once.
    #[error("duplicate main category '{0}'")]
    DuplicateGroup(String),
}

/// One main category and its ordered sub-categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryGroup {
    /// Main category name.
    pub name: String,
    /// Ordered, non-empty list of sub-categories.
    pub sub_categories: Vec<String>,
}

/// Ordered list of main categories, each mapping to an ordered list of
/// sub-categories. Static configuration data; never mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTree {
    groups: Vec<CategoryGroup>,
}

impl CategoryTree {
    /// Build a tree from its groups, validating the invariants:
    /// at least one group, every group non-empty, unique group names.
    pub fn new(groups: Vec<CategoryGroup>) -> Result<Self, CategoryTreeError> {
        if groups.is_empty() {
            return Err(CategoryTreeError::Empty);
        }
        let mut seen = std::collections::HashSet::new();
        for group in &groups {
            if group.sub_categories.is_empty() {
                return Err(CategoryTreeError::EmptyGroup(group.name.clone()));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(CategoryTreeError::DuplicateGroup(group.name.clone()));
            }
        }
        Ok(Self { groups })
    }

    /// The groups in walking order.
    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// First (main, sub) pair of the tree.
    pub fn first(&self) -> (&str, &str) {
        let group = &self.groups[0];
        (group.name.as_str(), group.sub_categories[0].as_str())
    }

    /// Index of a main category, if present.
    pub fn group_index(&self, main: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == main)
    }

    /// Total number of (main, sub) pairs in one full cycle.
    pub fn pair_count(&self) -> usize {
        self.groups.iter().map(|g| g.sub_categories.len()).sum()
    }
}
