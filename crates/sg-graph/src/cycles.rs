use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::ControlFlow;

use sg_core::Node;

use crate::model::StoryGraph;
use crate::scc::strongly_connected_components;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSearchOptions {
    /// Enumeration stops once this many cycles have been found.
    pub max_cycles: usize,
    /// Components larger than this are reported but not enumerated.
    pub max_component_size: usize,
}

impl Default for CycleSearchOptions {
    fn default() -> Self {
        Self {
            max_cycles: 200,
            max_component_size: 500,
        }
    }
}

/// A simple cycle starting at its smallest node. `choices[i]` labels the
/// edge leaving `nodes[i]`; the last entry is the edge closing the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub nodes: Vec<Node>,
    pub choices: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentCycles {
    pub size: usize,
    pub sample: Node,
    pub cycles: Vec<Cycle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedComponent {
    pub size: usize,
    pub sample: Node,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub component_count: usize,
    /// Components with at least one cycle, searched or not.
    pub cyclic_count: usize,
    pub components: Vec<ComponentCycles>,
    pub skipped: Vec<SkippedComponent>,
    /// The cycle cap was reached; later components were not searched.
    pub truncated: bool,
}

impl CycleReport {
    pub fn total_cycles(&self) -> usize {
        self.components
            .iter()
            .map(|component| component.cycles.len())
            .sum()
    }

    pub fn cycles(&self) -> impl Iterator<Item = &Cycle> {
        self.components
            .iter()
            .flat_map(|component| component.cycles.iter())
    }
}

/// Finds the cyclic components and enumerates their simple cycles, largest
/// component first. Each cycle is reported once, starting at its smallest node.
pub fn find_cycles(graph: &StoryGraph, options: CycleSearchOptions) -> CycleReport {
    let mut components = strongly_connected_components(graph);
    for component in &mut components {
        component.sort();
    }
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    let cyclic_count = components
        .iter()
        .filter(|members| members.len() > 1 || graph.has_self_loop(&members[0]))
        .count();
    let mut report = CycleReport {
        component_count: components.len(),
        cyclic_count,
        ..CycleReport::default()
    };
    let mut remaining = options.max_cycles;

    for members in components {
        let size = members.len();
        let sample = members[0].clone();
        if size == 1 && !graph.has_self_loop(&sample) {
            continue;
        }
        if remaining == 0 {
            report.truncated = true;
            break;
        }
        if size > options.max_component_size {
            tracing::warn!(
                size,
                sample = %sample,
                limit = options.max_component_size,
                "skipping oversized component"
            );
            report.skipped.push(SkippedComponent { size, sample });
            continue;
        }

        let component = Component::new(graph, &members);
        let mut found = Vec::new();
        let flow = component.enumerate(remaining, &mut found);
        remaining -= found.len();
        report.components.push(ComponentCycles {
            size,
            sample,
            cycles: found,
        });
        if flow.is_break() {
            report.truncated = true;
            break;
        }
    }

    report
}

/// Adjacency restricted to one component, with parallel edges to the same
/// head collapsed onto the first one.
struct Component<'g> {
    members: BTreeSet<&'g Node>,
    adjacency: BTreeMap<&'g Node, Vec<(&'g Node, Option<&'g str>)>>,
}

struct Walk<'g> {
    start: &'g Node,
    path: Vec<&'g Node>,
    choices: Vec<Option<&'g str>>,
    on_path: HashSet<&'g Node>,
}

impl<'g> Component<'g> {
    fn new(graph: &'g StoryGraph, members: &'g [Node]) -> Self {
        let members: BTreeSet<&Node> = members.iter().collect();
        let adjacency = members
            .iter()
            .map(|&node| {
                let mut heads: Vec<(&Node, Option<&str>)> = Vec::new();
                for edge in graph.successors(node) {
                    let known = heads.iter().any(|(head, _)| *head == &edge.head);
                    if members.contains(&edge.head) && !known {
                        heads.push((&edge.head, edge.choice.as_deref()));
                    }
                }
                (node, heads)
            })
            .collect();
        Self { members, adjacency }
    }

    fn enumerate(&self, limit: usize, found: &mut Vec<Cycle>) -> ControlFlow<()> {
        for &start in &self.members {
            let mut walk = Walk {
                start,
                path: vec![start],
                choices: Vec::new(),
                on_path: HashSet::from([start]),
            };
            self.extend(&mut walk, start, limit, found)?;
        }
        ControlFlow::Continue(())
    }

    fn extend(
        &self,
        walk: &mut Walk<'g>,
        current: &'g Node,
        limit: usize,
        found: &mut Vec<Cycle>,
    ) -> ControlFlow<()> {
        let Some(heads) = self.adjacency.get(current) else {
            return ControlFlow::Continue(());
        };

        for &(next, choice) in heads {
            if next < walk.start {
                continue;
            }
            if next == walk.start {
                found.push(walk.close(choice));
                if found.len() >= limit {
                    return ControlFlow::Break(());
                }
                continue;
            }
            if walk.on_path.contains(next) {
                continue;
            }

            walk.path.push(next);
            walk.choices.push(choice);
            walk.on_path.insert(next);
            let flow = self.extend(walk, next, limit, found);
            walk.on_path.remove(next);
            walk.choices.pop();
            walk.path.pop();
            flow?;
        }
        ControlFlow::Continue(())
    }
}

impl Walk<'_> {
    fn close(&self, choice: Option<&str>) -> Cycle {
        Cycle {
            nodes: self.path.iter().map(|node| (*node).clone()).collect(),
            choices: self
                .choices
                .iter()
                .copied()
                .chain([choice])
                .map(|choice| choice.map(str::to_string))
                .collect(),
        }
    }
}
