//! Dependency graph over string keys.
//!
//! A directed graph of package paths and synthetic keys. An edge `a → b`
//! means "a depends on b". Subscribers watch a key and are notified when
//! that key or any of its transitive dependencies changes; notification
//! walks the reverse adjacency with a visited set, so dependency cycles
//! cannot produce unbounded fanout.
//!
//! The graph stores no callbacks: [`DependencyGraph::changed`] returns the
//! tags of affected subscriptions and the caller routes them (the program
//! routes scope names to scope invalidation). This keeps every subscription
//! owned by exactly one parent object.

use indexmap::IndexSet;
use std::collections::HashMap;

/// Handle returned by [`DependencyGraph::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle(usize);

#[derive(Debug, Clone)]
struct Subscription {
    key: String,
    tag: String,
}

/// String-keyed directed dependency graph with change subscriptions.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// key → keys it depends on
    edges: HashMap<String, IndexSet<String>>,
    /// key → keys that depend on it (reverse adjacency)
    dependents: HashMap<String, IndexSet<String>>,
    subscriptions: Vec<Option<Subscription>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a node exists.
    pub fn add_node(&mut self, key: &str) {
        self.edges.entry(key.to_string()).or_default();
        self.dependents.entry(key.to_string()).or_default();
    }

    /// Add a dependency edge `from → to`; both nodes are created as needed.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.add_node(from);
        self.add_node(to);
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
        self.dependents
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string());
    }

    /// Replace the outgoing edges of `from` with `deps`.
    pub fn set_edges(&mut self, from: &str, deps: impl IntoIterator<Item = String>) {
        self.clear_edges(from);
        for dep in deps {
            self.add_edge(from, &dep);
        }
    }

    fn clear_edges(&mut self, from: &str) {
        self.add_node(from);
        if let Some(old) = self.edges.insert(from.to_string(), IndexSet::new()) {
            for dep in old {
                if let Some(set) = self.dependents.get_mut(&dep) {
                    set.shift_remove(from);
                }
            }
        }
    }

    /// Remove a node and every incident edge.
    pub fn remove_node(&mut self, key: &str) {
        if let Some(deps) = self.edges.remove(key) {
            for dep in deps {
                if let Some(set) = self.dependents.get_mut(&dep) {
                    set.shift_remove(key);
                }
            }
        }
        if let Some(dependents) = self.dependents.remove(key) {
            for dependent in dependents {
                if let Some(set) = self.edges.get_mut(&dependent) {
                    set.shift_remove(key);
                }
            }
        }
    }

    pub fn has_node(&self, key: &str) -> bool {
        self.edges.contains_key(key)
    }

    /// Watch `key`; the returned handle owns the subscription. `tag` is
    /// handed back from [`DependencyGraph::changed`] when the subscription
    /// fires.
    pub fn subscribe(&mut self, key: impl Into<String>, tag: impl Into<String>) -> SubscriptionHandle {
        let subscription = Subscription {
            key: key.into(),
            tag: tag.into(),
        };
        for (idx, slot) in self.subscriptions.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(subscription);
                return SubscriptionHandle(idx);
            }
        }
        self.subscriptions.push(Some(subscription));
        SubscriptionHandle(self.subscriptions.len() - 1)
    }

    /// Release a subscription. Releasing twice is a no-op.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        if let Some(slot) = self.subscriptions.get_mut(handle.0) {
            *slot = None;
        }
    }

    /// Report that `key` changed. Returns the tags of every subscription
    /// watching `key` or any key that transitively depends on it, in
    /// subscription order, deduplicated.
    pub fn changed(&self, key: &str) -> Vec<String> {
        // Reachable set over reverse edges, cycle-safe
        let mut reached: IndexSet<&str> = IndexSet::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if !reached.insert(current) {
                continue;
            }
            if let Some(dependents) = self.dependents.get(current) {
                for dependent in dependents {
                    if !reached.contains(dependent.as_str()) {
                        stack.push(dependent);
                    }
                }
            }
        }

        let mut tags: IndexSet<String> = IndexSet::new();
        for subscription in self.subscriptions.iter().flatten() {
            if reached.contains(subscription.key.as_str()) {
                tags.insert(subscription.tag.clone());
            }
        }
        tags.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_subscription_fires() {
        let mut graph = DependencyGraph::new();
        graph.add_node("a");
        graph.subscribe("a", "scope-a");
        assert_eq!(graph.changed("a"), vec!["scope-a".to_string()]);
    }

    #[test]
    fn test_transitive_dependency_fires_subscriber() {
        let mut graph = DependencyGraph::new();
        // component descriptor depends on its imported script
        graph.add_edge("components/widget.xml", "source/util.brs");
        graph.subscribe("components/widget.xml", "widget-scope");

        let tags = graph.changed("source/util.brs");
        assert_eq!(tags, vec!["widget-scope".to_string()]);
    }

    #[test]
    fn test_chain_notification() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.subscribe("a", "a-watcher");

        assert_eq!(graph.changed("c"), vec!["a-watcher".to_string()]);
    }

    #[test]
    fn test_cycle_is_bounded() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");
        graph.subscribe("a", "a-watcher");
        graph.subscribe("b", "b-watcher");

        let tags = graph.changed("a");
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_unrelated_change_does_not_fire() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_node("c");
        graph.subscribe("a", "a-watcher");

        assert!(graph.changed("c").is_empty());
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut graph = DependencyGraph::new();
        graph.add_node("a");
        let handle = graph.subscribe("a", "a-watcher");
        graph.unsubscribe(handle);
        assert!(graph.changed("a").is_empty());
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.subscribe("a", "a-watcher");

        graph.remove_node("b");
        assert!(graph.changed("c").is_empty());
        assert!(!graph.has_node("b"));
    }

    #[test]
    fn test_set_edges_replaces_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.set_edges("desc", vec!["old.brs".to_string()]);
        graph.subscribe("desc", "scope");
        assert_eq!(graph.changed("old.brs").len(), 1);

        graph.set_edges("desc", vec!["new.brs".to_string()]);
        assert!(graph.changed("old.brs").is_empty());
        assert_eq!(graph.changed("new.brs").len(), 1);
    }

    #[test]
    fn test_tags_deduplicate() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "c");
        graph.add_edge("b", "c");
        graph.subscribe("a", "same-scope");
        graph.subscribe("b", "same-scope");

        assert_eq!(graph.changed("c"), vec!["same-scope".to_string()]);
    }
}
