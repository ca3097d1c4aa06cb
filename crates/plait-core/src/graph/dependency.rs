//! Depends-on adjacency for one owner.
//!
//! Design:
//! - Forward edges: task -> tasks it depends on (its prerequisites)
//! - Reverse edges: task -> tasks that depend on it (its dependents)
//! - Invariant: edges and reverse_edges are kept in sync, and neither map
//!   holds an empty set
//!
//! Adjacency sets are ordered so every query and traversal is deterministic.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::domain::{DependencyEdge, TaskId};

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// dependent -> prerequisites
    edges: HashMap<TaskId, BTreeSet<TaskId>>,

    /// prerequisite -> dependents
    reverse_edges: HashMap<TaskId, BTreeSet<TaskId>>,

    edge_count: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent` depends on `prerequisite`.
    ///
    /// Returns `false` (and changes nothing) if the edge already exists.
    /// Callers are responsible for the self and cycle checks; see
    /// [`find_path`](Self::find_path).
    pub fn insert(&mut self, dependent: TaskId, prerequisite: TaskId) -> bool {
        if !self.edges.entry(dependent).or_default().insert(prerequisite) {
            return false;
        }
        self.reverse_edges
            .entry(prerequisite)
            .or_default()
            .insert(dependent);
        self.edge_count += 1;
        true
    }

    /// Drop the edge. Returns `false` if it did not exist.
    pub fn remove(&mut self, dependent: TaskId, prerequisite: TaskId) -> bool {
        let removed = detach(&mut self.edges, dependent, prerequisite);
        if removed {
            detach(&mut self.reverse_edges, prerequisite, dependent);
            self.edge_count -= 1;
        }
        removed
    }

    /// Drop every edge where `task` is an endpoint and return them.
    pub fn remove_node(&mut self, task: TaskId) -> Vec<DependencyEdge> {
        let mut removed = Vec::new();

        if let Some(prerequisites) = self.edges.remove(&task) {
            for prerequisite in prerequisites {
                detach(&mut self.reverse_edges, prerequisite, task);
                removed.push(DependencyEdge::new(task, prerequisite));
            }
        }
        if let Some(dependents) = self.reverse_edges.remove(&task) {
            for dependent in dependents {
                detach(&mut self.edges, dependent, task);
                removed.push(DependencyEdge::new(dependent, task));
            }
        }

        self.edge_count -= removed.len();
        removed
    }

    pub fn contains(&self, dependent: TaskId, prerequisite: TaskId) -> bool {
        self.edges
            .get(&dependent)
            .is_some_and(|prerequisites| prerequisites.contains(&prerequisite))
    }

    /// Direct prerequisites of `task`, ascending.
    pub fn prerequisites(&self, task: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.edges.get(&task).into_iter().flatten().copied()
    }

    /// Direct dependents of `task`, ascending.
    pub fn dependents(&self, task: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.reverse_edges.get(&task).into_iter().flatten().copied()
    }

    pub fn has_edges(&self, task: TaskId) -> bool {
        self.edges.contains_key(&task) || self.reverse_edges.contains_key(&task)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.edges.iter().flat_map(|(&dependent, prerequisites)| {
            prerequisites
                .iter()
                .map(move |&prerequisite| DependencyEdge::new(dependent, prerequisite))
        })
    }

    /// Breadth-first search from `from` along prerequisite edges.
    ///
    /// Returns the path `[from, .., to]` if `to` is reachable. Adding the edge
    /// `to -> from` would close exactly this path into a cycle. O(V + E).
    pub fn find_path(&self, from: TaskId, to: TaskId) -> Option<Vec<TaskId>> {
        if from == to {
            return Some(vec![from]);
        }

        let mut prev: HashMap<TaskId, TaskId> = HashMap::new();
        let mut visited: HashSet<TaskId> = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(node) = queue.pop_front() {
            for next in self.prerequisites(node) {
                if !visited.insert(next) {
                    continue;
                }
                prev.insert(next, node);
                if next == to {
                    return Some(follow_path(from, to, &prev));
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// Every task reachable from `task` along prerequisite edges, excluding
    /// `task` itself.
    pub fn reachable_prerequisites(&self, task: TaskId) -> HashSet<TaskId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<TaskId> = self.prerequisites(task).collect();
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend(self.prerequisites(node));
            }
        }
        seen.remove(&task);
        seen
    }

    /// Kahn's algorithm over the whole graph. O(V + E).
    pub fn is_acyclic(&self) -> bool {
        let mut pending: HashMap<TaskId, usize> = HashMap::new();
        for (&dependent, prerequisites) in &self.edges {
            pending.insert(dependent, prerequisites.len());
        }
        let mut ready: Vec<TaskId> = self
            .reverse_edges
            .keys()
            .filter(|task| !pending.contains_key(task))
            .copied()
            .collect();

        let mut resolved = 0;
        while let Some(task) = ready.pop() {
            resolved += 1;
            for dependent in self.dependents(task) {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(dependent);
                    }
                }
            }
        }

        let nodes: HashSet<&TaskId> = self.edges.keys().chain(self.reverse_edges.keys()).collect();
        resolved == nodes.len()
    }
}

fn detach(map: &mut HashMap<TaskId, BTreeSet<TaskId>>, key: TaskId, value: TaskId) -> bool {
    match map.entry(key) {
        Entry::Occupied(mut e) => {
            let removed = e.get_mut().remove(&value);
            if e.get().is_empty() {
                e.remove_entry();
            }
            removed
        }
        Entry::Vacant(_) => false,
    }
}

fn follow_path(from: TaskId, to: TaskId, prev: &HashMap<TaskId, TaskId>) -> Vec<TaskId> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        match prev.get(&current) {
            Some(&p) => {
                path.push(p);
                current = p;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: u64) -> TaskId {
        TaskId::new(n)
    }

    #[test]
    fn new_graph_is_empty() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.has_edges(t(1)));
        assert!(graph.is_acyclic());
    }

    #[test]
    fn insert_creates_forward_and_reverse_edge() {
        let mut graph = DependencyGraph::new();

        assert!(graph.insert(t(2), t(1))); // 2 depends on 1

        assert!(graph.contains(t(2), t(1)));
        assert!(!graph.contains(t(1), t(2)));
        assert_eq!(graph.prerequisites(t(2)).collect::<Vec<_>>(), vec![t(1)]);
        assert_eq!(graph.dependents(t(1)).collect::<Vec<_>>(), vec![t(2)]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn duplicate_insert_is_reported() {
        let mut graph = DependencyGraph::new();
        assert!(graph.insert(t(2), t(1)));
        assert!(!graph.insert(t(2), t(1)));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn remove_drops_both_directions() {
        let mut graph = DependencyGraph::new();
        graph.insert(t(2), t(1));

        assert!(graph.remove(t(2), t(1)));
        assert!(!graph.remove(t(2), t(1)));

        assert!(!graph.has_edges(t(1)));
        assert!(!graph.has_edges(t(2)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn remove_node_cascades_both_sides() {
        let mut graph = DependencyGraph::new();
        // 1 -> 2 -> 3, and 4 -> 2
        graph.insert(t(1), t(2));
        graph.insert(t(2), t(3));
        graph.insert(t(4), t(2));

        let mut removed = graph.remove_node(t(2));
        removed.sort();

        assert_eq!(
            removed,
            vec![
                DependencyEdge::new(t(1), t(2)),
                DependencyEdge::new(t(2), t(3)),
                DependencyEdge::new(t(4), t(2)),
            ]
        );
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.has_edges(t(1)));
        assert!(!graph.has_edges(t(3)));
        assert!(!graph.has_edges(t(4)));
    }

    #[test]
    fn prerequisites_are_sorted() {
        let mut graph = DependencyGraph::new();
        graph.insert(t(9), t(5));
        graph.insert(t(9), t(1));
        graph.insert(t(9), t(3));

        assert_eq!(
            graph.prerequisites(t(9)).collect::<Vec<_>>(),
            vec![t(1), t(3), t(5)]
        );
    }

    #[test]
    fn find_path_follows_prerequisites() {
        let mut graph = DependencyGraph::new();
        // 1 depends on 2, 2 depends on 3
        graph.insert(t(1), t(2));
        graph.insert(t(2), t(3));

        assert_eq!(graph.find_path(t(1), t(3)), Some(vec![t(1), t(2), t(3)]));
        assert_eq!(graph.find_path(t(3), t(1)), None);
    }

    #[test]
    fn find_path_prefers_shortest_route() {
        let mut graph = DependencyGraph::new();
        // 1 -> 2 -> 3 -> 4 and a shortcut 1 -> 4
        graph.insert(t(1), t(2));
        graph.insert(t(2), t(3));
        graph.insert(t(3), t(4));
        graph.insert(t(1), t(4));

        assert_eq!(graph.find_path(t(1), t(4)), Some(vec![t(1), t(4)]));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        //     1
        //    / \
        //   2   3
        //    \ /
        //     4
        graph.insert(t(2), t(1));
        graph.insert(t(3), t(1));
        graph.insert(t(4), t(2));
        graph.insert(t(4), t(3));

        assert!(graph.is_acyclic());
        assert_eq!(graph.find_path(t(1), t(4)), None);
        assert!(graph.find_path(t(4), t(1)).is_some());
    }

    #[test]
    fn unchecked_back_edge_is_seen_as_cycle() {
        let mut graph = DependencyGraph::new();
        graph.insert(t(1), t(2));
        graph.insert(t(2), t(3));
        graph.insert(t(3), t(1));

        assert!(!graph.is_acyclic());
    }

    #[test]
    fn reachable_prerequisites_excludes_start() {
        let mut graph = DependencyGraph::new();
        graph.insert(t(1), t(2));
        graph.insert(t(1), t(3));
        graph.insert(t(3), t(4));
        graph.insert(t(5), t(1));

        let reachable = graph.reachable_prerequisites(t(1));
        assert_eq!(reachable, HashSet::from([t(2), t(3), t(4)]));
    }

    #[test]
    fn edges_lists_every_pair() {
        let mut graph = DependencyGraph::new();
        graph.insert(t(1), t(2));
        graph.insert(t(3), t(2));

        let mut edges: Vec<_> = graph.edges().collect();
        edges.sort();
        assert_eq!(
            edges,
            vec![DependencyEdge::new(t(1), t(2)), DependencyEdge::new(t(3), t(2))]
        );
    }
}
