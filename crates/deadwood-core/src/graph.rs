//! Dependency graph with reachability and cycle detection.
//!
//! Nodes are arena-allocated with stable integer ids; adjacency is stored
//! as id-indexed, insertion-ordered vectors so traversal and reporting
//! stay deterministic. Cycle detection uses Tarjan's SCC algorithm.
//! Time complexity: O(V + E) where V = files, E = dependency edges.

use crate::error::{Error, Result};
use crate::types::EdgeKind;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

const MAX_MODULES: usize = 100_000;
const MAX_CYCLE_DEPTH: usize = 1_000;

/// Stable identifier of a graph node.
pub type NodeId = usize;

/// Per-file bookkeeping attached to a graph node.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Canonical absolute path of the file.
    pub path: PathBuf,

    /// Number of incoming edges (deduplicated by `(from, to, kind)`).
    pub in_degree: usize,

    /// The last observed incoming edge kind.
    pub last_import_kind: Option<EdgeKind>,

    /// Whether this node is an entry point.
    pub is_entry_point: bool,

    /// Whether the file name matches an architectural-core pattern.
    pub is_architectural_core: bool,

    /// Confidence assigned by the scorer, if the node was condemned.
    pub confidence: Option<u8>,

    /// Every incoming edge kind seen so far.
    incoming_kinds: Vec<EdgeKind>,
}

impl GraphNode {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            in_degree: 0,
            last_import_kind: None,
            is_entry_point: false,
            is_architectural_core: false,
            confidence: None,
            incoming_kinds: Vec::new(),
        }
    }

    /// True when the node has incoming edges and all of them are
    /// type-only imports.
    pub fn referenced_only_by_types(&self) -> bool {
        !self.incoming_kinds.is_empty()
            && self
                .incoming_kinds
                .iter()
                .all(|k| *k == EdgeKind::TypeImport)
    }
}

/// Typed, directed multigraph over file paths.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<PathBuf, NodeId>,
    /// Outgoing adjacency per node, insertion-ordered.
    edges: Vec<Vec<(NodeId, EdgeKind)>>,
    /// Deduplication set for `(from, to, kind)` triples.
    edge_set: HashSet<(NodeId, NodeId, EdgeKind)>,
    /// Entry points in the order they were registered.
    entry_points: Vec<NodeId>,
    edge_count: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent node creation. Returns the node's stable id.
    pub fn add_file(&mut self, path: &Path) -> NodeId {
        if let Some(&id) = self.index.get(path) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(GraphNode::new(path.to_path_buf()));
        self.edges.push(Vec::new());
        self.index.insert(path.to_path_buf(), id);
        id
    }

    /// Add a typed dependency edge. Both endpoints are created if absent;
    /// duplicate `(from, to, kind)` edges are coalesced.
    pub fn add_dependency(&mut self, from: &Path, to: &Path, kind: EdgeKind) {
        let from_id = self.add_file(from);
        let to_id = self.add_file(to);

        if !self.edge_set.insert((from_id, to_id, kind)) {
            return;
        }

        self.edges[from_id].push((to_id, kind));
        self.edge_count += 1;

        let target = &mut self.nodes[to_id];
        target.in_degree += 1;
        target.last_import_kind = Some(kind);
        target.incoming_kinds.push(kind);
    }

    /// Idempotent entry-point registration.
    pub fn add_entry_point(&mut self, path: &Path) {
        let id = self.add_file(path);
        if !self.nodes[id].is_entry_point {
            self.nodes[id].is_entry_point = true;
            self.entry_points.push(id);
        }
    }

    pub fn node(&self, path: &Path) -> Option<&GraphNode> {
        self.index.get(path).map(|&id| &self.nodes[id])
    }

    /// Flag a node as architectural core.
    ///
    /// # Errors
    /// `Error::MissingNode` if the file was never added.
    pub fn mark_architectural_core(&mut self, path: &Path) -> Result<()> {
        let id = self.index.get(path).ok_or_else(|| Error::MissingNode {
            path: path.to_path_buf(),
        })?;
        self.nodes[*id].is_architectural_core = true;
        Ok(())
    }

    /// Record the scorer's verdict on a node.
    ///
    /// # Errors
    /// `Error::MissingNode` if the file was never added.
    pub fn set_confidence(&mut self, path: &Path, confidence: u8) -> Result<()> {
        let id = self.index.get(path).ok_or_else(|| Error::MissingNode {
            path: path.to_path_buf(),
        })?;
        self.nodes[*id].confidence = Some(confidence);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Entry-point paths in registration order.
    pub fn entry_points(&self) -> impl Iterator<Item = &Path> {
        self.entry_points.iter().map(|&id| self.nodes[id].path.as_path())
    }

    /// BFS from the union of entry points over the forward edge relation,
    /// ignoring edge kind. Type-only edges participate: they still mark a
    /// real code-level reference.
    ///
    /// The queue preserves adjacency insertion order, so the traversal is
    /// deterministic given the same graph and entry set.
    pub fn find_reachable(&self) -> HashSet<PathBuf> {
        let mut visited: Vec<bool> = vec![false; self.nodes.len()];
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        for &entry in &self.entry_points {
            if !visited[entry] {
                visited[entry] = true;
                queue.push_back(entry);
            }
        }

        while let Some(id) = queue.pop_front() {
            for &(next, _kind) in &self.edges[id] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        self.nodes
            .iter()
            .enumerate()
            .filter(|(id, _)| visited[*id])
            .map(|(_, node)| node.path.clone())
            .collect()
    }

    /// Strongly connected components of size >= 2, plus single-node
    /// self-loops, in first-discovery order.
    ///
    /// # Errors
    /// - `Error::GraphTooLarge` if the node count exceeds `MAX_MODULES`
    /// - `Error::CycleTooDeep` if the traversal stack exceeds `MAX_CYCLE_DEPTH`
    pub fn cycles(&self) -> Result<Vec<Vec<PathBuf>>> {
        if self.nodes.len() > MAX_MODULES {
            return Err(Error::GraphTooLarge {
                module_count: self.nodes.len(),
                max_allowed: MAX_MODULES,
            });
        }

        let mut state = TarjanState::new(self.nodes.len());
        for id in 0..self.nodes.len() {
            if state.indices[id].is_none() {
                self.strongconnect(id, &mut state)?;
            }
        }

        let cycles = state
            .sccs
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.has_self_loop(scc[0]))
            .map(|scc| {
                scc.into_iter()
                    .map(|id| self.nodes[id].path.clone())
                    .collect()
            })
            .collect();

        Ok(cycles)
    }

    fn has_self_loop(&self, id: NodeId) -> bool {
        self.edges[id].iter().any(|&(next, _)| next == id)
    }

    /// Tarjan's algorithm - recursive strongconnect over node ids.
    fn strongconnect(&self, v: NodeId, state: &mut TarjanState) -> Result<()> {
        if state.stack.len() > MAX_CYCLE_DEPTH {
            return Err(Error::CycleTooDeep {
                depth: state.stack.len(),
                max_allowed: MAX_CYCLE_DEPTH,
            });
        }

        state.indices[v] = Some(state.index_counter);
        state.low_links[v] = state.index_counter;
        state.index_counter += 1;
        state.stack.push(v);
        state.on_stack[v] = true;

        for &(w, _kind) in &self.edges[v] {
            if state.indices[w].is_none() {
                self.strongconnect(w, state)?;
                state.low_links[v] = state.low_links[v].min(state.low_links[w]);
            } else if state.on_stack[w] {
                state.low_links[v] = state.low_links[v].min(state.indices[w].unwrap());
            }
        }

        // Found SCC root
        if Some(state.low_links[v]) == state.indices[v] {
            let mut scc = Vec::new();
            loop {
                let w = state.stack.pop().expect("Tarjan stack underflow");
                state.on_stack[w] = false;
                scc.push(w);
                if w == v {
                    break;
                }
            }
            state.sccs.push(scc);
        }

        Ok(())
    }
}

struct TarjanState {
    index_counter: usize,
    stack: Vec<NodeId>,
    indices: Vec<Option<usize>>,
    low_links: Vec<usize>,
    on_stack: Vec<bool>,
    sccs: Vec<Vec<NodeId>>,
}

impl TarjanState {
    fn new(node_count: usize) -> Self {
        Self {
            index_counter: 0,
            stack: Vec::new(),
            indices: vec![None; node_count],
            low_links: vec![0; node_count],
            on_stack: vec![false; node_count],
            sccs: Vec::new(),
        }
    }
}
