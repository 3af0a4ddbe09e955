use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use sg_core::Node;

use crate::model::{Edge, StoryGraph};

/// Per-node traversal cost: leaving a thread costs its dialogue count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailWeights(BTreeMap<Node, u64>);

impl TailWeights {
    pub fn from_counts(counts: BTreeMap<Node, usize>) -> Self {
        Self(
            counts
                .into_iter()
                .map(|(node, count)| (node, count as u64))
                .collect(),
        )
    }

    /// Threads without dialogue cost nothing to pass through.
    pub fn get(&self, node: &Node) -> u64 {
        self.0.get(node).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub node: Node,
    /// Choice on the edge that entered this node; `None` for the start.
    pub via_choice: Option<String>,
    /// Weight of the edge that entered this node; zero for the start.
    pub step_weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub cost: u64,
    pub steps: Vec<PathStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResult {
    Found(ShortestPath),
    Unreachable,
}

/// Dijkstra with every edge weighted by the dialogue count of its tail.
pub fn shortest_path(
    graph: &StoryGraph,
    weights: &TailWeights,
    start: &Node,
    goal: &Node,
) -> PathResult {
    shortest_path_by(graph, start, goal, |tail, _| weights.get(tail))
}

pub fn shortest_path_by<F>(graph: &StoryGraph, start: &Node, goal: &Node, weight: F) -> PathResult
where
    F: Fn(&Node, &Edge) -> u64,
{
    let mut distance: HashMap<Node, u64> = HashMap::from([(start.clone(), 0)]);
    let mut previous: HashMap<Node, (Node, Option<String>, u64)> = HashMap::new();
    let mut queue = BinaryHeap::from([Reverse((0u64, start.clone()))]);

    while let Some(Reverse((cost, node))) = queue.pop() {
        if &node == goal {
            return PathResult::Found(ShortestPath {
                cost,
                steps: trace_back(&previous, start, goal),
            });
        }
        if distance.get(&node).is_some_and(|best| cost > *best) {
            continue;
        }

        for edge in graph.successors(&node) {
            let step = weight(&node, edge);
            let candidate = cost.saturating_add(step);
            let improves = distance
                .get(&edge.head)
                .map_or(true, |best| candidate < *best);
            if improves {
                distance.insert(edge.head.clone(), candidate);
                previous.insert(edge.head.clone(), (node.clone(), edge.choice.clone(), step));
                queue.push(Reverse((candidate, edge.head.clone())));
            }
        }
    }

    PathResult::Unreachable
}

fn trace_back(
    previous: &HashMap<Node, (Node, Option<String>, u64)>,
    start: &Node,
    goal: &Node,
) -> Vec<PathStep> {
    let mut steps = Vec::new();
    let mut current = goal.clone();
    while &current != start {
        let Some((tail, choice, step)) = previous.get(&current) else {
            break;
        };
        steps.push(PathStep {
            node: current,
            via_choice: choice.clone(),
            step_weight: *step,
        });
        current = tail.clone();
    }
    steps.push(PathStep {
        node: current,
        via_choice: None,
        step_weight: 0,
    });
    steps.reverse();
    steps
}
