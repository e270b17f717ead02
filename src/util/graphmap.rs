use super::graph::{EdgeStatus, Graph};
use std::{collections::HashMap, hash::Hash};

/// A `Graph` paired with a lookup table so nodes can be addressed by a
/// hashable key as well as by index.
#[derive(Debug, PartialEq)]
pub struct GraphMap<K: Eq + Hash + Clone, V, E> {
    graph: Graph<K, E>,
    map: HashMap<K, Node<V>>,
}

#[derive(Debug, PartialEq)]
pub struct Node<V>(V, usize);

impl<V> Node<V> {
    pub fn index(&self) -> usize {
        self.1
    }

    pub fn as_ref(&self) -> &V {
        &self.0
    }
}

impl<K: Eq + Hash + Clone, V, E> GraphMap<K, V, E> {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            map: HashMap::new(),
        }
    }

    /// Adds a new node under `key`, or returns the existing node's index when
    /// the key is already present.
    pub fn add_node(&mut self, key: K, value: V) -> usize {
        if let Some(node) = self.map.get(&key) {
            return node.index();
        }
        let iden = self.graph.add_node(key.clone());
        self.map.insert(key, Node(value, iden));
        iden
    }

    pub fn has_node_by_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn add_edge_by_key(&mut self, source: &K, target: &K, cost: E) -> EdgeStatus {
        let source = match self.map.get(source) {
            Some(i) => i.index(),
            None => return EdgeStatus::MissingSource,
        };
        let target = match self.map.get(target) {
            Some(i) => i.index(),
            None => return EdgeStatus::MissingTarget,
        };
        self.graph.add_edge(source, target, cost)
    }

    pub fn add_edge_by_index(&mut self, source: usize, target: usize, cost: E) -> EdgeStatus {
        self.graph.add_edge(source, target, cost)
    }

    pub fn get_node_by_key(&self, key: &K) -> Option<&Node<V>> {
        self.map.get(key)
    }

    pub fn get_node_by_index(&self, index: usize) -> Option<&Node<V>> {
        self.map.get(self.graph.get_node(index)?)
    }

    pub fn get_key_by_index(&self, index: usize) -> Option<&K> {
        Some(self.graph.get_node(index)?)
    }

    pub fn get_graph(&self) -> &Graph<K, E> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn node_reuse_by_key() {
        let mut gm: GraphMap<&str, u8, ()> = GraphMap::new();
        let a = gm.add_node("a", 10);
        assert_eq!(gm.add_node("a", 99), a);
        assert_eq!(gm.get_node_by_key(&"a").unwrap().as_ref(), &10);
        assert_eq!(gm.node_count(), 1);
    }

    #[test]
    fn edges_by_key() {
        let mut gm: GraphMap<&str, (), ()> = GraphMap::new();
        gm.add_node("a", ());
        gm.add_node("b", ());
        assert_eq!(gm.add_edge_by_key(&"a", &"b", ()).is_ok(), true);
        assert_eq!(gm.add_edge_by_key(&"a", &"b", ()).is_ok(), false);
        assert_eq!(gm.get_graph().edge_count(), 1);
    }
}
