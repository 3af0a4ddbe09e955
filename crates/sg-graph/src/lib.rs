mod cycles;
mod model;
mod scc;
mod shortest;

pub use cycles::{
    find_cycles, ComponentCycles, Cycle, CycleReport, CycleSearchOptions, SkippedComponent,
};
pub use model::{Edge, StoryGraph};
pub use scc::strongly_connected_components;
pub use shortest::{
    shortest_path, shortest_path_by, PathResult, PathStep, ShortestPath, TailWeights,
};
