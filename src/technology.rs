use crate::error::{ReportError, Result};
use crate::exec::CommandRunner;
use crate::markdown::{self, Column, Row};
use crate::model::{LanguageStats, TechnologyRow};
use crate::util::{format_delta, format_number};
use indexmap::IndexMap;
use serde_json::Value;

/// Technology name to composition counts, in the order the tool reported them.
pub type Snapshot = IndexMap<String, LanguageStats>;

pub const COLUMNS: [Column; 7] = [
    Column::left("Technology", "tech"),
    Column::right("Files", "files"),
    Column::left("delta", "filesDelta"),
    Column::right("Code", "code"),
    Column::left("delta", "codeDelta"),
    Column::right("Comments", "comments"),
    Column::left("delta", "commentsDelta"),
];

/// Parses `cloc --json` output, dropping its `header` entry.
pub fn parse_snapshot(json: &str) -> Result<Snapshot> {
    let mut document: IndexMap<String, Value> = serde_json::from_str(json)?;
    document.shift_remove("header");

    document
        .into_iter()
        .map(|(tech, value)| {
            let stats: LanguageStats = serde_json::from_value(value)
                .map_err(|e| ReportError::Parse(format!("cloc entry `{tech}`: {e}")))?;
            Ok((tech, stats))
        })
        .collect()
}

/// Counts lines at `commit` with the external line-counting tool.
pub fn fetch_snapshot<R: CommandRunner>(runner: &R, commit: &str) -> Result<Snapshot> {
    let output = runner.run("cloc", &[commit, "--json", "--quiet"])?;
    parse_snapshot(&output)
}

/// Builds one row per technology found in either snapshot. Technologies new in
/// `current` come first, then the baseline's technologies in baseline order.
/// With `only_deltas`, rows without any change are dropped.
pub fn compute_technology_deltas(
    baseline: &Snapshot,
    current: &Snapshot,
    only_deltas: bool,
) -> Vec<TechnologyRow> {
    let new_technologies = current.keys().filter(|tech| !baseline.contains_key(*tech));

    new_technologies
        .chain(baseline.keys())
        .map(|tech| {
            let now = current.get(tech).copied().unwrap_or_default();
            let before = baseline.get(tech).copied().unwrap_or_default();
            TechnologyRow {
                technology: tech.clone(),
                files: now.files,
                files_delta: format_delta(now.files, before.files),
                code: now.code,
                code_delta: format_delta(now.code, before.code),
                comments: now.comments,
                comments_delta: format_delta(now.comments, before.comments),
            }
        })
        .filter(|row| !only_deltas || !row.is_unchanged())
        .collect()
}

pub fn to_table_row(row: &TechnologyRow) -> Row {
    Row::from([
        ("tech", row.technology.clone()),
        ("files", format_number(row.files)),
        ("filesDelta", row.files_delta.clone()),
        ("code", format_number(row.code)),
        ("codeDelta", row.code_delta.clone()),
        ("comments", format_number(row.comments)),
        ("commentsDelta", row.comments_delta.clone()),
    ])
}

pub fn render_table(rows: &[TechnologyRow]) -> Result<Vec<String>> {
    let rows: Vec<Row> = rows.iter().map(to_table_row).collect();
    markdown::render(&COLUMNS, &rows)
}
