/// Basic directed graph data structure
/// - source: http://smallcultfollowing.com/babysteps/blog/2015/04/06/modeling-graphs-in-rust-using-vector-indices/
use std::collections::HashSet;

type NodeIndex = usize;

#[derive(Debug, PartialEq)]
struct NodeData<V> {
    node: V,
    first_outgoing_edge: Option<EdgeIndex>,
    first_incoming_edge: Option<EdgeIndex>,
}

type EdgeIndex = usize;

#[derive(Debug, PartialEq)]
struct EdgeData<E> {
    edge: E,
    source: NodeIndex,
    target: NodeIndex,
    next_outgoing_edge: Option<EdgeIndex>,
    next_incoming_edge: Option<EdgeIndex>,
}

/// A digraph where an edge `u -> v` reads as "u must be processed before v".
///
/// Nodes and edges are stored in insertion order; all traversals are a pure
/// function of that order so repeated runs yield identical results.
#[derive(Debug, PartialEq)]
pub struct Graph<V, E> {
    vertices: Vec<NodeData<V>>,
    edges: Vec<EdgeData<E>>,
}

impl<V, E> Graph<V, E> {
    /// Creates an empty `Graph` struct.
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            vertices: Vec::new(),
        }
    }

    /// Adds a new node to the graph.
    ///
    /// Returns the `NodeIndex` to remember the node.
    pub fn add_node(&mut self, node: V) -> NodeIndex {
        let index = self.vertices.len();
        self.vertices.push(NodeData {
            node: node,
            first_outgoing_edge: None,
            first_incoming_edge: None,
        });
        index
    }

    /// Checks if a given `source` node is connected to the given `target` node.
    pub fn has_edge(&self, source: NodeIndex, target: NodeIndex) -> bool {
        let mut successors = self.successors(source);
        successors.find(|f| f == &target).is_some()
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Accesses the node data behind the `node` index.
    pub fn get_node(&self, node: NodeIndex) -> Option<&V> {
        Some(&self.vertices.get(node)?.node)
    }

    /// Adds a new edge to the graph from `source` to `target`.
    ///
    /// Returns `Success` if the edge insertion occurred. Duplicate edges and
    /// self-loops are rejected.
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, cost: E) -> EdgeStatus {
        // do not allow duplicate edges
        if self.has_edge(source, target) == true {
            return EdgeStatus::AlreadyExists;
        }
        // do not allow self-loops
        if source == target {
            return EdgeStatus::SelfLoop;
        }

        let edge_index = self.edges.len();
        // enter source -> target data
        {
            let node_data = &mut self.vertices[source];
            self.edges.push(EdgeData {
                source: source,
                edge: cost,
                target: target,
                next_outgoing_edge: node_data.first_outgoing_edge,
                next_incoming_edge: None,
            });
            node_data.first_outgoing_edge = Some(edge_index);
        }
        // enter target <- source data
        let rev_node_data = &mut self.vertices[target];
        let incoming_edge = rev_node_data.first_incoming_edge;
        rev_node_data.first_incoming_edge = Some(edge_index);
        // update the edge data
        self.edges.last_mut().unwrap().next_incoming_edge = incoming_edge;
        EdgeStatus::Success
    }

    /// Returns the number of successors to the `source` node.
    pub fn out_degree(&self, source: NodeIndex) -> usize {
        self.successors(source).count()
    }

    /// Returns the number of predecessors to the `source` node.
    pub fn in_degree(&self, target: NodeIndex) -> usize {
        self.predecessors(target).count()
    }

    /// Creates an iterator over the incoming nodes to the `target` node.
    pub fn predecessors(&self, target: NodeIndex) -> Predecessors<V, E> {
        let first_incoming_edge = self.vertices[target].first_incoming_edge;
        Predecessors {
            graph: self,
            current_edge_index: first_incoming_edge,
        }
    }

    /// Creates an iterator over the outgoing nodes from the `source` node.
    pub fn successors(&self, source: NodeIndex) -> Successors<V, E> {
        let first_outgoing_edge = self.vertices[source].first_outgoing_edge;
        Successors {
            graph: self,
            current_edge_index: first_outgoing_edge,
        }
    }

    /// Creates an iterator over every edge as `(source, target, cost)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &E)> {
        self.edges.iter().map(|e| (e.source, e.target, &e.edge))
    }

    /// Checks if the graph has zero nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Performs a layered Kahn topological sort.
    ///
    /// All nodes whose dependencies are satisfied at the same round form one
    /// layer; inside a layer nodes are arranged by the total order computed
    /// with `key` so the final sequence does not depend on insertion order.
    ///
    /// Returns the nodes left unprocessed (all participating in at least one
    /// cycle) as the error value.
    pub fn layered_sort<K, F>(&self, key: F) -> Result<Vec<NodeIndex>, Vec<NodeIndex>>
    where
        K: Ord,
        F: Fn(NodeIndex) -> K,
    {
        let mut order = Vec::<NodeIndex>::with_capacity(self.node_count());
        let mut remaining: Vec<usize> = (0..self.node_count())
            .map(|i| self.in_degree(i))
            .collect();
        let mut layer: Vec<NodeIndex> = remaining
            .iter()
            .enumerate()
            .filter_map(|(i, d)| if d == &0 { Some(i) } else { None })
            .collect();
        while layer.is_empty() == false {
            layer.sort_by_key(|n| key(*n));
            let mut next_layer = Vec::new();
            for n in layer {
                order.push(n);
                for s in self.successors(n) {
                    remaining[s] -= 1;
                    if remaining[s] == 0 {
                        next_layer.push(s);
                    }
                }
            }
            layer = next_layer;
        }
        match order.len() == self.node_count() {
            true => Ok(order),
            false => {
                let placed: HashSet<NodeIndex> = order.into_iter().collect();
                Err((0..self.node_count())
                    .filter(|i| placed.contains(i) == false)
                    .collect())
            }
        }
    }

    /// Collects the distinct cycles in the graph.
    ///
    /// First peels away every node that cannot be on a cycle, then walks the
    /// remaining core extracting one closed path per entry point. Overlapping
    /// cycles through a shared node are reported once.
    pub fn find_cycles(&self) -> Vec<Vec<NodeIndex>> {
        // peel acyclic fringe with repeated in-degree elimination
        let core: HashSet<NodeIndex> = match self.layered_sort(|n| n) {
            Ok(_) => return Vec::new(),
            Err(leftover) => leftover.into_iter().collect(),
        };
        let mut cycles = Vec::new();
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut entries: Vec<NodeIndex> = core.iter().copied().collect();
        entries.sort();
        for entry in entries {
            if visited.contains(&entry) == true {
                continue;
            }
            let mut path: Vec<NodeIndex> = Vec::new();
            let mut current = entry;
            loop {
                if let Some(pos) = path.iter().position(|p| p == &current) {
                    cycles.push(path[pos..].to_vec());
                    break;
                }
                path.push(current);
                let mut hops: Vec<NodeIndex> = self
                    .successors(current)
                    .filter(|s| core.contains(s) == true)
                    .collect();
                hops.sort();
                // a hop back into the path closes a cycle; otherwise keep
                // exploring fresh nodes
                current = match hops.iter().find(|h| path.contains(h) == true) {
                    Some(back) => *back,
                    None => match hops.into_iter().find(|h| visited.contains(h) == false) {
                        Some(n) => n,
                        // only already-extracted territory remains
                        None => break,
                    },
                };
            }
            visited.extend(path);
        }
        cycles
    }
}

pub struct Predecessors<'graph, V, E> {
    graph: &'graph Graph<V, E>,
    current_edge_index: Option<EdgeIndex>,
}

impl<'graph, V, E> Iterator for Predecessors<'graph, V, E> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current_edge_index {
            None => None,
            Some(edge_num) => {
                let edge = &self.graph.edges[edge_num];
                self.current_edge_index = edge.next_incoming_edge;
                Some(edge.source)
            }
        }
    }
}

pub struct Successors<'graph, V, E> {
    graph: &'graph Graph<V, E>,
    current_edge_index: Option<EdgeIndex>,
}

impl<'graph, V, E> Iterator for Successors<'graph, V, E> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current_edge_index {
            None => None,
            Some(edge_num) => {
                let edge = &self.graph.edges[edge_num];
                self.current_edge_index = edge.next_outgoing_edge;
                Some(edge.target)
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum EdgeStatus {
    MissingSource,
    MissingTarget,
    SelfLoop,
    AlreadyExists,
    Success,
}

impl EdgeStatus {
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Success => true,
            _ => false,
        }
    }
}
