//! Claim reference graph: edges, dependency depth and cycle detection.
//!
//! Claim numbers are mapped to dense indices and every traversal runs on an
//! explicit stack, so depth is bounded by the claim count rather than the call
//! stack. Levels and cyclic groups come from one depth-first pass plus one
//! strongly-connected-component pass, both linear in claims plus references.
//! Reported cycles are one per cyclic group, then extra cycles until every
//! cyclic claim is covered or `max_reported_cycles` is reached.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::claim::Claim;

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:claim|权利要求|權利要求|请求项|請求項)\s*(\d+)").unwrap()
});

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Dependency depth of a claim. `Unbounded` marks claims on, or depending on, a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Depth(u32),
    Unbounded,
}

impl Level {
    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    pub fn depth(self) -> Option<u32> {
        match self {
            Self::Depth(d) => Some(d),
            Self::Unbounded => None,
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Depth(d) => serializer.serialize_u32(*d),
            Self::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependencyGraph {
    /// Claim number -> claims it references. Every claim has an entry.
    pub adjacency: BTreeMap<u32, BTreeSet<u32>>,
    pub levels: BTreeMap<u32, Level>,
    /// Each cycle starts at its smallest claim number; the closing node is not repeated
    pub cycles: Vec<Vec<u32>>,
    /// References to claim numbers that do not exist in the document
    pub dangling: BTreeMap<u32, BTreeSet<u32>>,
    /// Some cyclic claims appear in no reported cycle because the limit was hit
    pub cycles_truncated: bool,
}

impl DependencyGraph {
    /// Scans every claim for references, fills in `dependency_refs` and
    /// computes levels and cycles. Cycles beyond one per cyclic group stop at
    /// `max_cycles` in total.
    pub fn build(claims: &mut [Claim], max_cycles: usize) -> Self {
        let existing: BTreeSet<u32> = claims.iter().map(|c| c.number).collect();
        let mut adjacency = BTreeMap::new();
        let mut dangling = BTreeMap::new();

        for claim in claims.iter_mut() {
            let mut refs = BTreeSet::new();
            let mut missing = BTreeSet::new();
            for caps in REFERENCE_RE.captures_iter(&claim.text) {
                let Ok(target) = caps[1].parse::<u32>() else {
                    continue;
                };
                if target == claim.number {
                    continue;
                }
                if existing.contains(&target) {
                    refs.insert(target);
                } else {
                    missing.insert(target);
                }
            }
            if !missing.is_empty() {
                dangling.insert(claim.number, missing);
            }
            claim.dependency_refs = refs.clone();
            adjacency.insert(claim.number, refs);
        }

        let graph = IndexedGraph::from_adjacency(&adjacency);
        let levels = compute_levels(&graph);
        let sweep = detect_cycles(&graph, max_cycles);

        let mut cycles: Vec<Vec<u32>> = sweep
            .cycles
            .iter()
            .map(|cycle| canonical_cycle(cycle.iter().map(|&i| graph.number(i)).collect()))
            .collect();
        cycles.sort();
        cycles.dedup();

        let levels = levels
            .into_iter()
            .enumerate()
            .map(|(i, level)| (graph.number(i), level))
            .collect();

        tracing::debug!(
            claims = graph.len(),
            cycles = cycles.len(),
            truncated = sweep.truncated,
            dangling = dangling.len(),
            "built dependency graph"
        );

        Self {
            adjacency,
            levels,
            cycles,
            dangling,
            cycles_truncated: sweep.truncated,
        }
    }
}

/// Rotates a cycle so it starts at its smallest member.
fn canonical_cycle(mut cycle: Vec<u32>) -> Vec<u32> {
    if let Some(pos) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, n)| **n)
        .map(|(pos, _)| pos)
    {
        cycle.rotate_left(pos);
    }
    cycle
}

// ---------------------------------------------------------------------------
// Index-based graph
// ---------------------------------------------------------------------------

/// Dense view of the reference graph. Index `i` is the i-th smallest claim number.
#[derive(Debug, Clone, Default)]
pub struct IndexedGraph {
    numbers: Vec<u32>,
    edges: Vec<Vec<usize>>,
}

impl IndexedGraph {
    /// Targets that are not keys of `adjacency` are dropped.
    pub fn from_adjacency(adjacency: &BTreeMap<u32, BTreeSet<u32>>) -> Self {
        let numbers: Vec<u32> = adjacency.keys().copied().collect();
        let edges = adjacency
            .values()
            .map(|targets| {
                targets
                    .iter()
                    .filter_map(|t| numbers.binary_search(t).ok())
                    .collect()
            })
            .collect();
        Self { numbers, edges }
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn number(&self, index: usize) -> u32 {
        self.numbers[index]
    }

    pub fn successors(&self, index: usize) -> &[usize] {
        &self.edges[index]
    }
}

/// Post-order of an iterative depth-first sweep from every node in index order.
///
/// A node that is not on a cycle finishes after all of its successors.
fn finish_order(graph: &IndexedGraph) -> Vec<usize> {
    let mut visited = vec![false; graph.len()];
    let mut order = Vec::with_capacity(graph.len());
    // (node, index of the next successor to try)
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for root in 0..graph.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            match graph.successors(node).get(next).copied() {
                Some(succ) => {
                    frame.1 += 1;
                    if !visited[succ] {
                        visited[succ] = true;
                        frames.push((succ, 0));
                    }
                }
                None => {
                    frames.pop();
                    order.push(node);
                }
            }
        }
    }
    order
}

/// Kosaraju's second pass over the reversed graph, in reverse finish order.
/// Returns the component id of every node.
fn strongly_connected(graph: &IndexedGraph, finish_order: &[usize]) -> Vec<usize> {
    let mut reversed = vec![Vec::new(); graph.len()];
    for node in 0..graph.len() {
        for &succ in graph.successors(node) {
            reversed[succ].push(node);
        }
    }

    let mut component = vec![usize::MAX; graph.len()];
    let mut next_id = 0;
    let mut stack = Vec::new();
    for &root in finish_order.iter().rev() {
        if component[root] != usize::MAX {
            continue;
        }
        component[root] = next_id;
        stack.push(root);
        while let Some(node) = stack.pop() {
            for &pred in &reversed[node] {
                if component[pred] == usize::MAX {
                    component[pred] = next_id;
                    stack.push(pred);
                }
            }
        }
        next_id += 1;
    }
    component
}

/// A node is cyclic when its component has more than one member or it refers to itself.
fn cyclic_nodes(graph: &IndexedGraph, component: &[usize]) -> Vec<bool> {
    let mut size = vec![0usize; graph.len()];
    for &id in component {
        size[id] += 1;
    }
    (0..graph.len())
        .map(|node| size[component[node]] > 1 || graph.successors(node).contains(&node))
        .collect()
}

/// Dependency depth per index.
///
/// Cyclic nodes are `Unbounded`, and so is every node with an `Unbounded`
/// dependency. Other nodes are processed in finish order, when all of their
/// dependencies already have a level.
pub fn compute_levels(graph: &IndexedGraph) -> Vec<Level> {
    let order = finish_order(graph);
    let component = strongly_connected(graph, &order);
    let cyclic = cyclic_nodes(graph, &component);

    let mut levels = vec![Level::Unbounded; graph.len()];
    for &node in &order {
        if cyclic[node] {
            continue;
        }
        let mut level = Level::Depth(0);
        for &succ in graph.successors(node) {
            level = match (level, levels[succ]) {
                (Level::Depth(current), Level::Depth(dep)) => Level::Depth(current.max(dep + 1)),
                _ => Level::Unbounded,
            };
        }
        levels[node] = level;
    }
    levels
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSweep {
    /// Node sequences, closing node not repeated
    pub cycles: Vec<Vec<usize>>,
    /// The limit stopped the sweep before every cyclic node was covered
    pub truncated: bool,
}

impl CycleSweep {
    fn record(&mut self, cycle: Vec<usize>, covered: &mut [bool]) {
        for &member in &cycle {
            covered[member] = true;
        }
        self.cycles.push(cycle);
    }
}

/// Whole-graph cycle sweep, independent of level computation.
///
/// Every cyclic group gets the shortest cycle through its lowest index. Then
/// each cyclic node not yet on a reported cycle gets its own shortest cycle,
/// until the total reaches `limit`.
pub fn detect_cycles(graph: &IndexedGraph, limit: usize) -> CycleSweep {
    let order = finish_order(graph);
    let component = strongly_connected(graph, &order);
    let cyclic = cyclic_nodes(graph, &component);

    let mut search = CycleSearch::new(graph.len());
    let mut covered = vec![false; graph.len()];
    let mut group_done = vec![false; graph.len()];
    let mut sweep = CycleSweep::default();

    for node in 0..graph.len() {
        if !cyclic[node] || group_done[component[node]] {
            continue;
        }
        group_done[component[node]] = true;
        if let Some(cycle) = search.shortest_cycle(graph, &component, node) {
            sweep.record(cycle, &mut covered);
        }
    }

    for node in 0..graph.len() {
        if !cyclic[node] || covered[node] {
            continue;
        }
        if sweep.cycles.len() >= limit {
            sweep.truncated = true;
            break;
        }
        if let Some(cycle) = search.shortest_cycle(graph, &component, node) {
            sweep.record(cycle, &mut covered);
        }
    }
    sweep
}

/// Breadth-first search buffers shared across searches. Only touched entries
/// are reset, so one search costs the size of the component it explores.
struct CycleSearch {
    parent: Vec<Option<usize>>,
    seen: Vec<bool>,
    touched: Vec<usize>,
    queue: VecDeque<usize>,
}

impl CycleSearch {
    fn new(len: usize) -> Self {
        Self {
            parent: vec![None; len],
            seen: vec![false; len],
            touched: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    fn reset(&mut self) {
        for &node in &self.touched {
            self.seen[node] = false;
            self.parent[node] = None;
        }
        self.touched.clear();
        self.queue.clear();
    }

    /// Shortest way from `start` back to itself inside its component.
    fn shortest_cycle(
        &mut self,
        graph: &IndexedGraph,
        component: &[usize],
        start: usize,
    ) -> Option<Vec<usize>> {
        self.reset();
        self.seen[start] = true;
        self.touched.push(start);
        self.queue.push_back(start);

        while let Some(node) = self.queue.pop_front() {
            for &succ in graph.successors(node) {
                if component[succ] != component[start] {
                    continue;
                }
                if succ == start {
                    let mut cycle = vec![node];
                    let mut cursor = node;
                    while let Some(prev) = self.parent[cursor] {
                        cycle.push(prev);
                        cursor = prev;
                    }
                    cycle.reverse();
                    return Some(cycle);
                }
                if !self.seen[succ] {
                    self.seen[succ] = true;
                    self.parent[succ] = Some(node);
                    self.touched.push(succ);
                    self.queue.push_back(succ);
                }
            }
        }
        None
    }
}
