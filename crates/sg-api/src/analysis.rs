use sg_core::{Node, StoryError};
use sg_graph::{
    find_cycles, shortest_path, CycleReport, CycleSearchOptions, PathResult, StoryGraph,
    TailWeights,
};
use sg_store::RecordStore;

pub fn load_graph(store: &impl RecordStore) -> Result<StoryGraph, StoryError> {
    let edges = store.edges()?;
    let graph = StoryGraph::from_edges(&edges);
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        tails = graph.tail_count(),
        "loaded story graph"
    );
    Ok(graph)
}

pub fn analyze_cycles(
    store: &impl RecordStore,
    options: CycleSearchOptions,
) -> Result<(StoryGraph, CycleReport), StoryError> {
    let graph = load_graph(store)?;
    let report = find_cycles(&graph, options);
    Ok((graph, report))
}

/// Cheapest route from `start` to `goal`, paying each thread's dialogue count
/// when leaving it.
pub fn shortest_route(
    store: &impl RecordStore,
    start: &Node,
    goal: &Node,
) -> Result<PathResult, StoryError> {
    let graph = load_graph(store)?;
    if !graph.contains(start) {
        tracing::warn!(node = %start, "start node has no edges");
    }
    if !graph.contains(goal) {
        tracing::warn!(node = %goal, "goal node has no edges");
    }
    let weights = TailWeights::from_counts(store.dialogue_counts()?);
    Ok(shortest_path(&graph, &weights, start, goal))
}
