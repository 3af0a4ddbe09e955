use sg_api::BatchReport;
use sg_graph::{CycleReport, PathResult, StoryGraph};

pub(crate) fn batch_lines(report: &BatchReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.failures.len() + 6);
    for failure in &report.failures {
        lines.push(format!(
            "FAILED:{}:{}:{}",
            failure.script_id,
            failure.error.code,
            failure.path.display()
        ));
    }
    lines.push("RESULT:OK".to_string());
    lines.push(format!("PROCESSED:{}", report.processed));
    lines.push(format!("SKIPPED:{}", report.skipped));
    lines.push(format!("FAILED_FILES:{}", report.failures.len()));
    lines.push(format!("RECORDS:{}", report.records));
    lines.push(format!("WARNINGS:{}", report.warnings));
    lines
}

pub(crate) fn cycle_lines(
    graph: &StoryGraph,
    report: &CycleReport,
    show_choices: bool,
) -> Vec<String> {
    let mut lines = vec![
        format!(
            "graph: {} nodes, {} edges, {} tails",
            graph.node_count(),
            graph.edge_count(),
            graph.tail_count()
        ),
        format!(
            "strongly connected components: {}, with cycles: {}",
            report.component_count, report.cyclic_count
        ),
    ];

    for skipped in &report.skipped {
        lines.push(format!(
            "skipped component of {} nodes containing {}",
            skipped.size, skipped.sample
        ));
    }

    for component in &report.components {
        lines.push(format!(
            "component of {} nodes containing {}: {} cycles",
            component.size,
            component.sample,
            component.cycles.len()
        ));
        for cycle in &component.cycles {
            let mut rendered = String::new();
            for (index, node) in cycle.nodes.iter().enumerate() {
                rendered.push_str(&node.to_string());
                rendered.push_str(" -> ");
                if show_choices {
                    if let Some(Some(choice)) = cycle.choices.get(index) {
                        rendered.push_str(&format!("[{}] ", choice));
                    }
                }
            }
            if let Some(first) = cycle.nodes.first() {
                rendered.push_str(&first.to_string());
            }
            lines.push(format!("  {}", rendered));
        }
    }

    lines.push(format!("total cycles: {}", report.total_cycles()));
    if report.truncated {
        lines.push("cycle limit reached; list is incomplete".to_string());
    }
    lines
}

pub(crate) fn path_lines(result: &PathResult) -> Vec<String> {
    let path = match result {
        PathResult::Found(path) => path,
        PathResult::Unreachable => return vec!["no path".to_string()],
    };

    let mut lines = vec![format!("cost: {}", path.cost)];
    for step in &path.steps {
        match &step.via_choice {
            Some(choice) => lines.push(format!(
                "  {} via \"{}\" (+{})",
                step.node, choice, step.step_weight
            )),
            None => lines.push(format!("  {} (+{})", step.node, step.step_weight)),
        }
    }
    lines
}
