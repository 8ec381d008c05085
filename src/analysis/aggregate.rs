//! # Per-scope statistics
//!
//! Groups a bounded multiset of completed measurements into accumulators
//! keyed by scope identity:
//!
//! - **Tree mode** keys on the full scope name, so `A::B` and `C::B` stay
//!   distinct and keep their caller-chain identity. Entries are assembled
//!   into an explicit tree by `::`-prefix parent relationships.
//! - **Flat mode** keys on the terminal component only, so `A::B` and
//!   `C::B` merge into one `B` entry totalling all occurrences.
//!
//! Tree output is ordered by descending inclusive sum, flat output by
//! descending exclusive sum; ties are unordered.

use std::collections::HashMap;

use crate::timing::CompletedEvent;

/// Grouping mode for one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMode {
    /// Group by full scope name, preserving the caller chain.
    Tree,
    /// Group by terminal name only, merging occurrences from anywhere in
    /// the hierarchy.
    Flat,
}

/// Statistics accumulator for one group. Lives for one report pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateEntry {
    /// Full scope name (tree) or terminal name (flat).
    pub key: String,
    pub count: u64,
    pub inclusive_sum: f64,
    pub exclusive_sum: f64,
    pub min_inclusive: f64,
    pub max_inclusive: f64,
    pub min_exclusive: f64,
    pub max_exclusive: f64,
}

impl AggregateEntry {
    fn new(key: String, event: &CompletedEvent) -> Self {
        Self {
            key,
            count: 1,
            inclusive_sum: event.inclusive,
            exclusive_sum: event.exclusive,
            min_inclusive: event.inclusive,
            max_inclusive: event.inclusive,
            min_exclusive: event.exclusive,
            max_exclusive: event.exclusive,
        }
    }

    fn record(&mut self, event: &CompletedEvent) {
        self.count += 1;
        self.inclusive_sum += event.inclusive;
        self.exclusive_sum += event.exclusive;
        self.min_inclusive = self.min_inclusive.min(event.inclusive);
        self.max_inclusive = self.max_inclusive.max(event.inclusive);
        self.min_exclusive = self.min_exclusive.min(event.exclusive);
        self.max_exclusive = self.max_exclusive.max(event.exclusive);
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_inclusive(&self) -> f64 {
        self.inclusive_sum / self.count as f64
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_exclusive(&self) -> f64 {
        self.exclusive_sum / self.count as f64
    }
}

/// One node of the tree-mode output. The parent exclusively owns its
/// children by value.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateNode {
    pub entry: AggregateEntry,
    pub children: Vec<AggregateNode>,
}

/// Result of one aggregation pass, handed to the report renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Tree(Vec<AggregateNode>),
    Flat(Vec<AggregateEntry>),
}

impl Aggregation {
    /// Whether this pass produced no groups at all. A valid outcome; the
    /// renderer emits nothing for an empty scope.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Aggregation::Tree(nodes) => nodes.is_empty(),
            Aggregation::Flat(entries) => entries.is_empty(),
        }
    }
}

/// Terminal component of a scope name: the substring after the last `::`.
#[must_use]
pub fn leaf_name(scope_name: &str) -> &str {
    scope_name.rsplit_once("::").map_or(scope_name, |(_, leaf)| leaf)
}

/// Group measurements into statistics under the given mode.
pub fn aggregate<'a, I>(events: I, mode: GroupingMode) -> Aggregation
where
    I: IntoIterator<Item = &'a CompletedEvent>,
{
    let mut groups: HashMap<String, AggregateEntry> = HashMap::new();

    for event in events {
        let key = match mode {
            GroupingMode::Tree => event.scope_name.as_str(),
            GroupingMode::Flat => leaf_name(&event.scope_name),
        };
        match groups.get_mut(key) {
            Some(entry) => entry.record(event),
            None => {
                groups.insert(key.to_string(), AggregateEntry::new(key.to_string(), event));
            }
        }
    }

    match mode {
        GroupingMode::Flat => {
            let mut entries: Vec<AggregateEntry> = groups.into_values().collect();
            entries.sort_unstable_by(|a, b| b.exclusive_sum.total_cmp(&a.exclusive_sum));
            Aggregation::Flat(entries)
        }
        GroupingMode::Tree => Aggregation::Tree(build_tree(groups)),
    }
}

/// Assemble tree-mode entries into parent-owned nodes by `::` prefix.
///
/// An entry whose parent scope never produced a measurement of its own
/// becomes a root, keeping its full key.
fn build_tree(mut groups: HashMap<String, AggregateEntry>) -> Vec<AggregateNode> {
    let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
    let mut root_keys: Vec<String> = Vec::new();

    for key in groups.keys() {
        match key.rsplit_once("::") {
            Some((parent, _)) if groups.contains_key(parent) => {
                children_of.entry(parent.to_string()).or_default().push(key.clone());
            }
            _ => root_keys.push(key.clone()),
        }
    }

    let mut roots: Vec<AggregateNode> = Vec::with_capacity(root_keys.len());
    for key in &root_keys {
        if let Some(node) = assemble(key, &mut groups, &children_of) {
            roots.push(node);
        }
    }
    roots.sort_unstable_by(|a, b| b.entry.inclusive_sum.total_cmp(&a.entry.inclusive_sum));
    roots
}

/// Assembles the subtree rooted at `key`; each entry is taken out of
/// `groups` exactly once.
///
/// Iterative with an explicit work stack, so scope-chain depth is bounded by
/// the heap rather than the thread stack.
fn assemble(
    key: &str,
    groups: &mut HashMap<String, AggregateEntry>,
    children_of: &HashMap<String, Vec<String>>,
) -> Option<AggregateNode> {
    struct InProgress {
        node: AggregateNode,
        pending: Vec<String>,
    }

    let entry = groups.remove(key)?;
    let mut stack = vec![InProgress {
        node: AggregateNode { entry, children: Vec::new() },
        pending: children_of.get(key).cloned().unwrap_or_default(),
    }];

    loop {
        let next_child = stack.last_mut().and_then(|frame| frame.pending.pop());
        match next_child {
            Some(child_key) => {
                if let Some(entry) = groups.remove(&child_key) {
                    stack.push(InProgress {
                        node: AggregateNode { entry, children: Vec::new() },
                        pending: children_of.get(&child_key).cloned().unwrap_or_default(),
                    });
                }
            }
            None => {
                let mut done = stack.pop()?;
                done.node
                    .children
                    .sort_unstable_by(|a, b| b.entry.inclusive_sum.total_cmp(&a.entry.inclusive_sum));
                match stack.last_mut() {
                    Some(parent) => parent.node.children.push(done.node),
                    None => return Some(done.node),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ThreadId;

    fn event(scope: &str, inclusive: f64, exclusive: f64) -> CompletedEvent {
        CompletedEvent {
            scope_name: scope.to_string(),
            inclusive,
            exclusive,
            thread_id: ThreadId(1),
            frame: None,
            start: 0.0,
            end: inclusive,
        }
    }

    #[test]
    fn test_flat_merges_by_terminal_name() {
        let events = [event("X::Y", 1.0, 0.5), event("Z::Y", 2.0, 1.5)];
        let Aggregation::Flat(entries) = aggregate(&events, GroupingMode::Flat) else {
            panic!("expected flat aggregation");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "Y");
        assert_eq!(entries[0].count, 2);
        assert!((entries[0].inclusive_sum - 3.0).abs() < 1e-9);
        assert!((entries[0].exclusive_sum - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_tree_keeps_caller_chains_distinct() {
        let events = [event("X::Y", 1.0, 0.5), event("Z::Y", 2.0, 1.5)];
        let Aggregation::Tree(roots) = aggregate(&events, GroupingMode::Tree) else {
            panic!("expected tree aggregation");
        };
        // No X or Z entries exist, so both become roots with full keys.
        assert_eq!(roots.len(), 2);
        let keys: Vec<&str> = roots.iter().map(|n| n.entry.key.as_str()).collect();
        assert!(keys.contains(&"X::Y"));
        assert!(keys.contains(&"Z::Y"));
        assert!(roots.iter().all(|n| n.entry.count == 1));
    }

    #[test]
    fn test_tree_nests_children_under_parents() {
        let events = [
            event("A", 10.0, 4.0),
            event("A::B", 4.0, 4.0),
            event("A::B", 2.0, 2.0),
            event("A::C", 1.0, 1.0),
        ];
        let Aggregation::Tree(roots) = aggregate(&events, GroupingMode::Tree) else {
            panic!("expected tree aggregation");
        };
        assert_eq!(roots.len(), 1);
        let a = &roots[0];
        assert_eq!(a.entry.key, "A");
        assert_eq!(a.children.len(), 2);
        // Siblings ordered by descending inclusive sum: A::B (6.0) first.
        assert_eq!(a.children[0].entry.key, "A::B");
        assert_eq!(a.children[0].entry.count, 2);
        assert_eq!(a.children[1].entry.key, "A::C");
    }

    #[test]
    fn test_min_max_track_extremes() {
        let events = [event("A", 5.0, 2.0), event("A", 1.0, 0.25), event("A", 3.0, 3.0)];
        let Aggregation::Flat(entries) = aggregate(&events, GroupingMode::Flat) else {
            panic!("expected flat aggregation");
        };
        let a = &entries[0];
        assert_eq!(a.count, 3);
        assert!((a.min_inclusive - 1.0).abs() < 1e-9);
        assert!((a.max_inclusive - 5.0).abs() < 1e-9);
        assert!((a.min_exclusive - 0.25).abs() < 1e-9);
        assert!((a.max_exclusive - 3.0).abs() < 1e-9);
        assert!((a.mean_inclusive() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_orders_by_descending_exclusive_sum() {
        let events = [event("A", 1.0, 1.0), event("B", 9.0, 0.5)];
        let Aggregation::Flat(entries) = aggregate(&events, GroupingMode::Flat) else {
            panic!("expected flat aggregation");
        };
        assert_eq!(entries[0].key, "A");
        assert_eq!(entries[1].key, "B");
    }

    #[test]
    fn test_deep_scope_chain_assembles_without_exhausting_the_stack() {
        // Run on a deliberately small thread stack: a chain this deep must
        // be assembled on the heap, not by recursion.
        let depth = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(|| {
                let mut key = String::from("x");
                let mut events = Vec::new();
                for _ in 0..2_000 {
                    events.push(event(&key, 1.0, 1.0));
                    key.push_str("::x");
                }
                let Aggregation::Tree(roots) = aggregate(&events, GroupingMode::Tree) else {
                    panic!("expected tree aggregation");
                };
                assert_eq!(roots.len(), 1);

                let mut depth = 1;
                let mut node = &roots[0];
                while let Some(child) = node.children.first() {
                    assert_eq!(node.children.len(), 1);
                    node = child;
                    depth += 1;
                }
                depth
            })
            .expect("spawn")
            .join()
            .expect("deep aggregation");
        assert_eq!(depth, 2_000);
    }

    #[test]
    fn test_empty_input_yields_empty_aggregation() {
        let aggregation = aggregate(std::iter::empty(), GroupingMode::Tree);
        assert!(aggregation.is_empty());
    }

    #[test]
    fn test_leaf_name_extraction() {
        assert_eq!(leaf_name("A::B::C"), "C");
        assert_eq!(leaf_name("solo"), "solo");
    }
}
