use std::ffi::OsString;

use clap::Parser;
use sg_api::{
    analyze_cycles, extract_directory, load_config, load_font_metrics, load_speakers,
    load_translations, rewrite_directory, shortest_route,
};
use sg_core::{Node, StoryError};
use sg_graph::CycleSearchOptions;
use sg_rewrite::Rewriter;
use sg_store::{JsonStore, RecordStore};

mod cli_args;
mod error_map;
mod logging;
mod report;

pub(crate) use cli_args::{
    Cli, Command, CyclesArgs, ExtractArgs, ImportTranslationsArgs, PathArgs, RewriteArgs,
};
pub(crate) use error_map::{emit_error, map_cli_node_script};
pub(crate) use logging::init_tracing;
pub(crate) use report::{batch_lines, cycle_lines, path_lines};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, StoryError> {
    match cli.command {
        Command::Extract(args) => run_extract(args),
        Command::ImportTranslations(args) => run_import_translations(args),
        Command::Rewrite(args) => run_rewrite(args),
        Command::Cycles(args) => run_cycles(args),
        Command::Path(args) => run_path(args),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

fn run_extract(args: ExtractArgs) -> Result<i32, StoryError> {
    let config = load_config(args.config.as_deref())?;
    let mut store = JsonStore::open(&args.store)?.deferred();
    let report = extract_directory(&config, &args.scripts_dir, &mut store)?;
    print_lines(batch_lines(&report));
    Ok(0)
}

fn run_import_translations(args: ImportTranslationsArgs) -> Result<i32, StoryError> {
    let translations = load_translations(&args.file)?;
    let mut store = JsonStore::open_existing(&args.store)?;
    let offered = translations.len();
    let stored = store.put_translations(translations)?;
    println!("RESULT:OK");
    println!("OFFERED:{}", offered);
    println!("STORED:{}", stored);
    Ok(0)
}

fn run_rewrite(args: RewriteArgs) -> Result<i32, StoryError> {
    let config = load_config(args.config.as_deref())?;
    let metrics = load_font_metrics(&args.font, &config)?;
    let speakers = load_speakers(args.speakers.as_deref())?;
    let store = JsonStore::open_existing(&args.store)?;
    let rewriter = Rewriter::new(&config, metrics, speakers);
    let report = rewrite_directory(&config, &rewriter, &args.scripts_dir, &args.out_dir, &store)?;
    print_lines(batch_lines(&report));
    Ok(0)
}

fn run_cycles(args: CyclesArgs) -> Result<i32, StoryError> {
    let store = JsonStore::open_existing(&args.store)?;
    let options = CycleSearchOptions {
        max_cycles: args.max_cycles,
        max_component_size: args.max_scc_size,
    };
    let (graph, report) = analyze_cycles(&store, options)?;
    print_lines(cycle_lines(&graph, &report, args.show_choices));
    Ok(0)
}

fn run_path(args: PathArgs) -> Result<i32, StoryError> {
    let start = parse_node(&args.start)?;
    let end = parse_node(&args.end)?;
    let store = JsonStore::open_existing(&args.store)?;
    let result = shortest_route(&store, &start, &end)?;
    print_lines(path_lines(&result));
    Ok(0)
}

/// `[script_id, thread]` as collected by `--start` / `--end`.
fn parse_node(values: &[String]) -> Result<Node, StoryError> {
    let [script_id, thread] = values else {
        return Err(StoryError::new(
            "CLI_NODE_INVALID",
            format!("expected SCRIPT_ID THREAD, got {:?}", values),
        ));
    };
    let script_id = script_id.parse().map_err(map_cli_node_script)?;
    Ok(Node::new(script_id, thread.as_str()))
}
