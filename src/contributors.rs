use crate::error::Result;
use crate::exec::CommandRunner;
use crate::markdown::{self, Column, Row};
use crate::model::{AuthorStats, ContributorRecord, ShortlogEntry};
use crate::util::format_number;
use indicatif::{ProgressBar, ProgressStyle};
use md5::{Digest, Md5};
use std::collections::HashMap;
use tracing::warn;

pub const COLUMNS: [Column; 5] = [
    Column::left(" ", "pictureRef"),
    Column::left("Name", "name"),
    Column::right("Commits", "commits"),
    Column::right("Additions", "additions"),
    Column::right("Deletions", "deletions"),
];

/// Parses `git shortlog -s -n -e` output. Lines that are not
/// `<count> <name> <email>` are skipped.
pub fn parse_shortlog(output: &str) -> Vec<ShortlogEntry> {
    output
        .lines()
        .enumerate()
        .filter_map(|(line, text)| {
            let (commits, name, email) = parse_shortlog_line(text)?;
            Some(ShortlogEntry {
                line,
                commits,
                name,
                email,
            })
        })
        .collect()
}

fn parse_shortlog_line(text: &str) -> Option<(u64, String, String)> {
    let text = text.trim_start();
    let digits = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    if digits == 0 {
        return None;
    }
    let commits = text[..digits].parse().ok()?;

    let after_count = &text[digits..];
    let rest = after_count.trim_start();
    if rest.len() == after_count.len() {
        return None;
    }

    let (name, rest) = rest.split_once('<')?;
    let name = name.trim();
    if name.is_empty() || name.contains('>') {
        return None;
    }

    let (email, tail) = rest.split_once('>')?;
    if email.is_empty() || email.contains('+') || !tail.trim().is_empty() {
        return None;
    }

    Some((commits, name.to_string(), email.to_string()))
}

/// Folds entries sharing a display name into one record. The commit count is
/// the sum; the other fields come from whichever entry had more commits (the
/// later one on a tie). Result is ordered by descending commit count, ties in
/// first-seen order.
pub fn merge_contributors(entries: Vec<ShortlogEntry>) -> Vec<ContributorRecord> {
    let mut records: Vec<ContributorRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let incoming = ContributorRecord {
            avatar_url: avatar_url(&entry.email),
            image_ref: format!("image-{}", entry.line),
            name: entry.name,
            email: entry.email,
            commits: entry.commits,
            additions: 0,
            deletions: 0,
        };

        match index.get(&incoming.name).copied() {
            Some(i) => {
                let existing = &mut records[i];
                let total = existing.commits.saturating_add(incoming.commits);
                if existing.commits <= incoming.commits {
                    *existing = incoming;
                }
                existing.commits = total;
            }
            None => {
                index.insert(incoming.name.clone(), records.len());
                records.push(incoming);
            }
        }
    }

    records.sort_by(|a, b| b.commits.cmp(&a.commits));
    records
}

/// Gravatar identicon URL for an email, keyed by the MD5 of its lowercase form.
pub fn avatar_url(email: &str) -> String {
    let digest = Md5::digest(email.to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{digest:x}?d=identicon&s=60")
}

/// Sums `insertions`/`deletions` across every `N file(s) changed` summary
/// line. Commit message lines are ignored even when they look numeric.
pub fn parse_shortstat(output: &str) -> AuthorStats {
    let mut stats = AuthorStats::default();

    for line in output.lines().filter(|l| is_summary_line(l)) {
        for item in line.split(',') {
            let mut parts = item.split_whitespace();
            let (Some(amount), Some(kind)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(amount) = amount.parse::<u64>() else {
                continue;
            };
            if kind.starts_with("ins") {
                stats.additions = stats.additions.saturating_add(amount);
            } else if kind.starts_with("del") {
                stats.deletions = stats.deletions.saturating_add(amount);
            }
        }
    }

    stats
}

fn is_summary_line(line: &str) -> bool {
    let Some((count, rest)) = line.trim_start().split_once(' ') else {
        return false;
    };
    !count.is_empty()
        && count.bytes().all(|b| b.is_ascii_digit())
        && (rest.starts_with("file changed") || rest.starts_with("files changed"))
}

pub fn author_stats<R: CommandRunner>(
    runner: &R,
    name: &str,
    base: &str,
    head: &str,
) -> Result<AuthorStats> {
    let author = format!("--author={name}");
    let range = format!("{base}..{head}");
    let output = runner.run("git", &["log", "--shortstat", "--format=", &author, &range])?;
    Ok(parse_shortstat(&output))
}

/// Contributors of the commits reachable from `head` but not from `base`,
/// merges excluded, with their line statistics.
///
/// Fails only when the shortlog itself is unavailable; a failed statistics
/// query leaves that author at zero.
pub fn compute_contributors<R: CommandRunner>(
    runner: &R,
    base: &str,
    head: &str,
) -> Result<Vec<ContributorRecord>> {
    let range = format!("{base}..{head}");
    let shortlog = runner.run("git", &["shortlog", "-s", "-n", "-e", "--no-merges", &range])?;
    let mut records = merge_contributors(parse_shortlog(&shortlog));

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{pos}/{len}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message("Collecting contributor statistics...");

    for record in &mut records {
        match author_stats(runner, &record.name, base, head) {
            Ok(stats) => {
                record.additions = stats.additions;
                record.deletions = stats.deletions;
            }
            Err(e) => warn!(author = %record.name, error = %e, "statistics unavailable"),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(records)
}

pub fn to_table_row(record: &ContributorRecord) -> Row {
    Row::from([
        ("pictureRef", format!("![{}][{}]", record.name, record.image_ref)),
        ("name", record.name.clone()),
        ("commits", format_number(record.commits)),
        ("additions", format_number(record.additions)),
        ("deletions", format_number(record.deletions)),
    ])
}

/// Reference-style image link definition for a contributor's avatar.
pub fn picture_line(record: &ContributorRecord) -> String {
    format!("[{}]: {} \"{}\"", record.image_ref, record.avatar_url, record.name)
}

/// Table lines, a blank separator, then the avatar link definitions.
pub fn render_section(records: &[ContributorRecord]) -> Result<Vec<String>> {
    let rows: Vec<Row> = records.iter().map(to_table_row).collect();
    let mut lines = markdown::render(&COLUMNS, &rows)?;
    lines.push(String::new());
    lines.extend(records.iter().map(picture_line));
    Ok(lines)
}
