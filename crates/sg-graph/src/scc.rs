use std::collections::HashMap;

use sg_core::Node;

use crate::model::StoryGraph;

const UNVISITED: usize = usize::MAX;

/// Tarjan's algorithm with an explicit call stack, so deep branch chains
/// cannot overflow the thread stack. Roots are visited in node order.
pub fn strongly_connected_components(graph: &StoryGraph) -> Vec<Vec<Node>> {
    let nodes: Vec<&Node> = graph.nodes().iter().collect();
    let position: HashMap<&Node, usize> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (*node, index))
        .collect();
    let successors: Vec<Vec<usize>> = nodes
        .iter()
        .map(|node| {
            graph
                .successors(node)
                .iter()
                .map(|edge| position[&edge.head])
                .collect()
        })
        .collect();

    let count = nodes.len();
    let mut index = vec![UNVISITED; count];
    let mut lowlink = vec![0usize; count];
    let mut on_stack = vec![false; count];
    let mut stack = Vec::new();
    let mut call_stack: Vec<(usize, usize)> = Vec::new();
    let mut next_index = 0usize;
    let mut components = Vec::new();

    for root in 0..count {
        if index[root] != UNVISITED {
            continue;
        }

        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        call_stack.push((root, 0));

        while let Some(frame) = call_stack.last_mut() {
            let v = frame.0;
            if frame.1 < successors[v].len() {
                let w = successors[v][frame.1];
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    call_stack.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            call_stack.pop();
            if let Some(&(parent, _)) = call_stack.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }

            if lowlink[v] == index[v] {
                let mut component = Vec::new();
                loop {
                    let w = stack.pop().expect("component root is on the stack");
                    on_stack[w] = false;
                    component.push(nodes[w].clone());
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}
