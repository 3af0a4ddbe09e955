use std::collections::{BTreeMap, BTreeSet};

use sg_core::{EdgeRecord, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub head: Node,
    pub choice: Option<String>,
}

/// Directed multigraph of threads. Nodes exist only as edge endpoints.
#[derive(Debug, Clone, Default)]
pub struct StoryGraph {
    nodes: BTreeSet<Node>,
    adjacency: BTreeMap<Node, Vec<Edge>>,
}

impl StoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a EdgeRecord>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge.clone());
        }
        graph
    }

    pub fn add_edge(&mut self, record: EdgeRecord) {
        let EdgeRecord { tail, head, choice } = record;
        self.nodes.insert(tail.clone());
        self.nodes.insert(head.clone());
        self.adjacency
            .entry(tail)
            .or_default()
            .push(Edge { head, choice });
    }

    pub fn nodes(&self) -> &BTreeSet<Node> {
        &self.nodes
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    pub fn successors(&self, node: &Node) -> &[Edge] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tails(&self) -> impl Iterator<Item = &Node> {
        self.adjacency.keys()
    }

    pub fn has_self_loop(&self, node: &Node) -> bool {
        self.successors(node).iter().any(|edge| &edge.head == node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn tail_count(&self) -> usize {
        self.adjacency.len()
    }
}
