//! Name lookup for timelines
//!
//! Composites refer to timelines by name. Anything that can answer "which
//! timeline is called X" implements [`Registry`]; a missing name is never an
//! error, callers just treat the layer as empty.

use std::collections::HashMap;

use crate::timeline::Timeline;

/// Common trait for registries that store named items.
///
/// # Example
///
/// ```
/// use sticsmith::registry::{Registry, TimelineRegistry};
/// use sticsmith::timeline::Timeline;
///
/// let mut registry = TimelineRegistry::new();
/// registry.register(Timeline::new("walk"));
///
/// assert!(registry.contains("walk"));
/// assert!(registry.get("run").is_none());
/// assert_eq!(registry.len(), 1);
/// ```
pub trait Registry<V> {
    /// Get an item by name.
    fn get(&self, name: &str) -> Option<&V>;

    /// Number of items in the registry.
    fn len(&self) -> usize;

    /// Check if an item with the given name exists in the registry.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Check if the registry is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registry of timelines keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TimelineRegistry {
    timelines: HashMap<String, Timeline>,
}

impl TimelineRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a timeline. A timeline with the same name is replaced.
    pub fn register(&mut self, timeline: Timeline) {
        self.timelines.insert(timeline.name.clone(), timeline);
    }

    /// Remove a timeline by name, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Timeline> {
        self.timelines.remove(name)
    }

    /// Names of all registered timelines, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.timelines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Registry<Timeline> for TimelineRegistry {
    fn get(&self, name: &str) -> Option<&Timeline> {
        self.timelines.get(name)
    }

    fn len(&self) -> usize {
        self.timelines.len()
    }
}

impl FromIterator<Timeline> for TimelineRegistry {
    fn from_iter<I: IntoIterator<Item = Timeline>>(iter: I) -> Self {
        let mut registry = Self::new();
        for timeline in iter {
            registry.register(timeline);
        }
        registry
    }
}

impl Registry<Timeline> for [Timeline] {
    /// First timeline with a matching name.
    fn get(&self, name: &str) -> Option<&Timeline> {
        self.iter().find(|t| t.name == name)
    }

    fn len(&self) -> usize {
        <[Timeline]>::len(self)
    }
}
