use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Resolved, comparable state for one report run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    pub title: String,
    pub only_deltas: bool,
    pub repository_path: String,
    /// Resolved label of the report side, e.g. `HEAD`, `v2.0.0` or a date.
    pub report_tag: Option<String>,
    /// Resolved label of the baseline side.
    pub diff_tag: Option<String>,
    pub commit: Option<String>,
    pub diff_commit: Option<String>,
    pub report_date: String,
    /// Canonical tag names, known when a specifier named a tag or a dated
    /// commit carries one.
    pub release_tag: Option<String>,
    pub release_diff_tag: Option<String>,
}

impl ReportConfig {
    /// Label shown for the report side.
    pub fn report_label(&self) -> Option<&str> {
        self.release_tag.as_deref().or(self.report_tag.as_deref())
    }

    /// Label shown for the baseline side.
    pub fn diff_label(&self) -> Option<&str> {
        self.release_diff_tag.as_deref().or(self.diff_tag.as_deref())
    }

    /// Both endpoints resolved to commits, so delta sections can run.
    pub fn commit_range(&self) -> Option<(&str, &str)> {
        match (self.diff_commit.as_deref(), self.commit.as_deref()) {
            (Some(base), Some(head)) => Some((base, head)),
            _ => None,
        }
    }

    pub fn is_head(&self) -> bool {
        self.report_tag.as_deref() == Some("HEAD")
    }
}

/// Per-technology composition counts from one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStats {
    #[serde(rename = "nFiles", default)]
    pub files: u64,
    #[serde(default)]
    pub code: u64,
    #[serde(rename = "comment", default)]
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyRow {
    pub technology: String,
    pub files: u64,
    pub files_delta: String,
    pub code: u64,
    pub code_delta: String,
    pub comments: u64,
    pub comments_delta: String,
}

impl TechnologyRow {
    pub fn is_unchanged(&self) -> bool {
        self.files_delta == "0" && self.code_delta == "0" && self.comments_delta == "0"
    }
}

/// One `count / name / email` line of a shortlog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortlogEntry {
    /// Zero-based line index within the shortlog output.
    pub line: usize,
    pub commits: u64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthorStats {
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub name: String,
    pub email: String,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    /// Reference key linking the table image to its link definition.
    pub image_ref: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub config: ReportConfig,
    pub changelog: Option<Vec<String>>,
    pub technologies: Option<Vec<TechnologyRow>>,
    pub contributors: Option<Vec<ContributorRecord>>,
}
