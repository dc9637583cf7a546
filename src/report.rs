use crate::changelog::{self, Start};
use crate::cli::{CommonArgs, StatsArgs};
use crate::contributors;
use crate::error::Result;
use crate::exec::{CommandRunner, ProcessRunner};
use crate::model::{ContributorRecord, ReportConfig, ReportOutput, TechnologyRow, SCHEMA_VERSION};
use crate::resolve::{build_config, ConfigOptions};
use crate::technology;
use anyhow::Context;
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Which report sections to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub changelog: bool,
    pub codebase: bool,
    pub contributors: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            changelog: true,
            codebase: true,
            contributors: true,
        }
    }
}

pub fn exec(common: CommonArgs, args: StatsArgs) -> anyhow::Result<()> {
    let repo = match common.repo {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let runner = ProcessRunner::new(&repo);

    let options = ConfigOptions {
        title: args.title.clone(),
        only_deltas: args.only_deltas,
        from: args.from.clone(),
        till: args.till.clone(),
        repository_path: repo.to_string_lossy().to_string(),
    };
    let config = build_config(&runner, &options).context("Failed to resolve report range")?;

    let sections = Sections {
        changelog: !args.no_changelog,
        codebase: !args.no_codebase,
        contributors: !args.no_contributors,
    };
    let changelog_path = changelog_path(runner.workdir(), &args.changelog);
    let output = collect(&runner, config, sections, &changelog_path);

    let mut stdout = std::io::stdout().lock();
    if args.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        for line in render_markdown(&output, sections).context("Failed to render report")? {
            writeln!(stdout, "{line}")?;
        }
    }

    Ok(())
}

fn changelog_path(repo: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        repo.join(file)
    }
}

/// Gathers the data of every enabled section. Sections whose inputs are
/// unavailable come back as `None`.
pub fn collect<R: CommandRunner>(
    runner: &R,
    config: ReportConfig,
    sections: Sections,
    changelog_path: &Path,
) -> ReportOutput {
    let changelog = sections
        .changelog
        .then(|| changelog_excerpt(&config, changelog_path))
        .flatten();
    let technologies = sections
        .codebase
        .then(|| technology_rows(runner, &config))
        .flatten();
    let contributors = sections
        .contributors
        .then(|| contributor_records(runner, &config))
        .flatten();

    ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        config,
        changelog,
        technologies,
        contributors,
    }
}

fn changelog_excerpt(config: &ReportConfig, path: &Path) -> Option<Vec<String>> {
    let document = match changelog::read(path) {
        Ok(document) => document,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "changelog unavailable");
            return None;
        }
    };

    let start = if config.is_head() {
        Start::FirstHeading
    } else {
        match config.report_label() {
            Some(label) => Start::Release(label),
            // no report label: the file exists but nothing can match
            None => return Some(Vec::new()),
        }
    };
    Some(changelog::excerpt(&document, start, config.diff_label()))
}

fn technology_rows<R: CommandRunner>(runner: &R, config: &ReportConfig) -> Option<Vec<TechnologyRow>> {
    let Some((base, head)) = config.commit_range() else {
        warn!("skipping codebase changes: report range is not fully resolved");
        return None;
    };

    let snapshots = technology::fetch_snapshot(runner, base)
        .and_then(|baseline| Ok((baseline, technology::fetch_snapshot(runner, head)?)));
    match snapshots {
        Ok((baseline, current)) => Some(technology::compute_technology_deltas(
            &baseline,
            &current,
            config.only_deltas,
        )),
        Err(e) => {
            warn!(error = %e, "skipping codebase changes: snapshot unavailable");
            None
        }
    }
}

fn contributor_records<R: CommandRunner>(
    runner: &R,
    config: &ReportConfig,
) -> Option<Vec<ContributorRecord>> {
    let Some((base, head)) = config.commit_range() else {
        warn!("skipping contributors: report range is not fully resolved");
        return None;
    };

    match contributors::compute_contributors(runner, base, head) {
        Ok(records) => Some(records),
        Err(e) => {
            warn!(error = %e, "skipping contributors: shortlog unavailable");
            None
        }
    }
}

/// Markdown lines of the whole report; each section ends with a blank line.
pub fn render_markdown(output: &ReportOutput, sections: Sections) -> Result<Vec<String>> {
    let config = &output.config;
    let diff_label = config.diff_label();
    let mut lines = vec![
        format!(
            "# {} for {} - {}",
            config.title,
            config.report_label().unwrap_or_default(),
            config.report_date
        ),
        String::new(),
    ];

    if sections.changelog {
        match &output.changelog {
            Some(excerpt) => {
                lines.push(format!("## Changelog since {}", diff_label.unwrap_or("start")));
                lines.push(String::new());
                lines.extend(excerpt.iter().cloned());
            }
            None => {
                lines.push("## No Changelog found".to_string());
                lines.push(String::new());
                lines.push(
                    "Please add a CHANGELOG.md according to <https://keepachangelog.com/>".to_string(),
                );
            }
        }
        lines.push(String::new());
    }

    if let Some(rows) = &output.technologies {
        lines.push(format!(
            "## Codebase technology changes since {}",
            diff_label.unwrap_or("start")
        ));
        lines.push(String::new());
        lines.extend(technology::render_table(rows)?);
        lines.push(String::new());
    }

    if let Some(records) = &output.contributors {
        let target = if config.is_head() {
            "here"
        } else {
            config.report_label().unwrap_or_default()
        };
        lines.push(format!(
            "## Contributors that brought us from {} to {}",
            diff_label.unwrap_or("start"),
            target
        ));
        lines.push(String::new());
        lines.extend(contributors::render_section(records)?);
        lines.push(String::new());
    }

    Ok(lines)
}
