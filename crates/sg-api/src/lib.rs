mod analysis;
mod batch;
mod error_map;
mod inputs;
mod source;

pub use analysis::{analyze_cycles, load_graph, shortest_route};
pub use batch::{extract_directory, rewrite_directory, BatchReport, FileFailure};
pub use inputs::{load_config, load_font_metrics, load_speakers, load_translations};
pub use source::{
    discover_scripts, resolve_dir, DiscoveredScripts, ScriptSource, SCRIPT_EXTENSION,
};

#[cfg(test)]
mod test_support;
