use std::fs;
use std::path::{Path, PathBuf};

use sg_core::{NotationConfig, ScriptId, StoryError};
use sg_parser::extract_script;
use sg_rewrite::Rewriter;
use sg_store::RecordStore;

use crate::error_map::map_api_output_write;
use crate::source::{discover_scripts, ScriptSource};

/// A script file that failed; the rest of the batch still ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub script_id: ScriptId,
    pub path: PathBuf,
    pub error: StoryError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Files that completed.
    pub processed: usize,
    /// Files discovered but left out of the run.
    pub skipped: usize,
    /// Dialogue and edge records committed, or dialogue sites rewritten.
    pub records: usize,
    pub warnings: usize,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    fn fail(&mut self, source: &ScriptSource, error: StoryError) {
        tracing::warn!(
            script_id = source.script_id,
            code = %error.code,
            "{}",
            error.message
        );
        self.failures.push(FileFailure {
            script_id: source.script_id,
            path: source.path.clone(),
            error,
        });
    }
}

/// Extracts every story script under `scripts_dir` and commits each file's
/// records to `store` as one unit. Parse failures and rejected commits are
/// file-scoped.
pub fn extract_directory(
    config: &NotationConfig,
    scripts_dir: &Path,
    store: &mut impl RecordStore,
) -> Result<BatchReport, StoryError> {
    let discovered = discover_scripts(scripts_dir, config)?;
    let mut report = BatchReport {
        skipped: discovered.skipped,
        ..BatchReport::default()
    };

    for source in &discovered.scripts {
        let extracted = source
            .read_lines()
            .and_then(|lines| extract_script(config, source.script_id, &lines));
        let batch = match extracted {
            Ok(batch) => batch,
            Err(error) => {
                report.fail(source, error);
                continue;
            }
        };

        let records = batch.dialogue.len() + batch.edges.len();
        if let Err(error) = store.commit_script(batch) {
            report.fail(source, error);
            continue;
        }
        tracing::debug!(script_id = source.script_id, records, "committed script");
        report.records += records;
        report.processed += 1;
    }
    store.flush()?;

    tracing::info!(
        processed = report.processed,
        failed = report.failures.len(),
        records = report.records,
        "extraction finished"
    );
    Ok(report)
}

/// Rewrites every script that has translated dialogue into `out_dir`, keeping
/// file names. Scripts without translations are not written.
pub fn rewrite_directory(
    config: &NotationConfig,
    rewriter: &Rewriter,
    scripts_dir: &Path,
    out_dir: &Path,
    store: &impl RecordStore,
) -> Result<BatchReport, StoryError> {
    let discovered = discover_scripts(scripts_dir, config)?;
    fs::create_dir_all(out_dir).map_err(|error| map_api_output_write(out_dir, error))?;
    let mut report = BatchReport {
        skipped: discovered.skipped,
        ..BatchReport::default()
    };

    for source in &discovered.scripts {
        let records = store.translated_dialogue(source.script_id)?;
        if records.is_empty() {
            report.skipped += 1;
            continue;
        }

        let rewritten = source
            .read_lines()
            .and_then(|lines| rewriter.rewrite_script(source.script_id, &lines, records));
        let outcome = match rewritten {
            Ok(outcome) => outcome,
            Err(error) => {
                report.fail(source, error);
                continue;
            }
        };

        let target = out_dir.join(source.file_name());
        let mut content = outcome.lines.join("\n");
        content.push('\n');
        if let Err(error) = fs::write(&target, content) {
            report.fail(source, map_api_output_write(&target, error));
            continue;
        }

        report.records += outcome.rewritten;
        report.warnings += outcome.warnings.len();
        report.processed += 1;
    }

    tracing::info!(
        processed = report.processed,
        failed = report.failures.len(),
        rewritten = report.records,
        warnings = report.warnings,
        "rewrite finished"
    );
    Ok(report)
}
