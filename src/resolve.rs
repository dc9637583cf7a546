use crate::error::{ReportError, Result};
use crate::exec::CommandRunner;
use crate::model::ReportConfig;
use crate::util::contains_iso_date;
use crate::version::{latest_of_major, SemanticVersion};
use tracing::{debug, info, warn};

/// A user supplied point in history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// Nearest tag reachable from the working tip.
    Latest,
    /// Latest release of `major(latest) - n`.
    LatestOfMajor(u64),
    /// Most recent commit at or before a calendar date.
    Date(String),
    /// Explicit tag or ref name, `HEAD` included.
    Ref(String),
}

impl Specifier {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input == "latest" {
            return Specifier::Latest;
        }
        if let Some(rest) = input.strip_prefix("latest-of-major") {
            if rest.is_empty() {
                return Specifier::LatestOfMajor(0);
            }
            if let Some(n) = rest
                .strip_prefix('-')
                .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|n| n.parse().ok())
            {
                return Specifier::LatestOfMajor(n);
            }
        }
        if contains_iso_date(input) {
            return Specifier::Date(input.to_string());
        }
        Specifier::Ref(input.to_string())
    }
}

/// Outcome of resolving one specifier. Absent fields mean "unavailable".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Label for the endpoint: the tag found, or the literal specifier.
    pub tag: Option<String>,
    pub commit: Option<String>,
    /// Canonical tag name when one is known for the commit.
    pub release_tag: Option<String>,
}

pub struct Resolver<'a, R: CommandRunner> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> Resolver<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Resolves a specifier. Only a missing `latest` tag is an error; every
    /// other failure leaves fields of the resolution empty.
    pub fn resolve(&self, specifier: &Specifier) -> Result<Resolution> {
        match specifier {
            Specifier::Latest => {
                let tag = self.require_latest_tag()?;
                Ok(self.resolve_ref(&tag))
            }
            Specifier::LatestOfMajor(delta) => {
                let latest = self.require_latest_tag()?;
                match self.search_of_major(&latest, *delta) {
                    Some(tag) => Ok(self.resolve_ref(&tag)),
                    None => {
                        warn!(%latest, delta, "no release found for requested major version");
                        Ok(Resolution::default())
                    }
                }
            }
            Specifier::Date(date) => {
                let commit = self.commit_for_date(date);
                let release_tag = commit.as_deref().and_then(|c| self.tag_at(c));
                Ok(Resolution {
                    tag: Some(date.clone()),
                    commit,
                    release_tag,
                })
            }
            Specifier::Ref(name) => Ok(self.resolve_ref(name)),
        }
    }

    fn resolve_ref(&self, name: &str) -> Resolution {
        Resolution {
            tag: Some(name.to_string()),
            commit: self.commit_for_ref(name),
            release_tag: Some(name.to_string()),
        }
    }

    fn require_latest_tag(&self) -> Result<String> {
        self.latest_tag().ok_or_else(|| {
            ReportError::Resolution("no tag found in repository history".to_string())
        })
    }

    pub fn latest_tag(&self) -> Option<String> {
        self.query("git", &["describe", "--abbrev=0", "--tags"])
    }

    /// Every tag in the repository, one per entry.
    pub fn tags(&self) -> Vec<String> {
        self.query("git", &["tag", "--list"])
            .map(|out| out.lines().map(|l| l.trim().to_string()).collect())
            .unwrap_or_default()
    }

    fn search_of_major(&self, latest: &str, delta: u64) -> Option<String> {
        let current = SemanticVersion::parse(latest)?;
        let major = current.major.checked_sub(delta)?;
        let tags = self.tags();
        latest_of_major(tags.iter().map(String::as_str), major).map(|v| v.to_string())
    }

    pub fn commit_for_ref(&self, name: &str) -> Option<String> {
        self.query("git", &["rev-list", "-n", "1", name])
    }

    pub fn commit_for_date(&self, date: &str) -> Option<String> {
        let before = format!("--before={date}");
        self.query("git", &["rev-list", "-n", "1", &before, "HEAD"])
    }

    /// Tag pointing exactly at `commit`, if any.
    pub fn tag_at(&self, commit: &str) -> Option<String> {
        self.query("git", &["describe", "--tags", "--exact-match", commit])
    }

    /// Short author date (`YYYY-MM-DD`) of `commit`.
    pub fn commit_date(&self, commit: &str) -> Option<String> {
        self.query(
            "git",
            &["log", commit, "-n", "1", "--format=%ad", "--date=short"],
        )
    }

    fn query(&self, program: &str, args: &[&str]) -> Option<String> {
        match self.runner.run(program, args) {
            Ok(out) if !out.is_empty() => Some(out),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "query failed");
                None
            }
        }
    }
}

/// Options the report configuration is built from.
#[derive(Debug, Clone)]
pub struct ConfigOptions {
    pub title: String,
    pub only_deltas: bool,
    pub from: String,
    pub till: String,
    pub repository_path: String,
}

/// Resolves both endpoints into an immutable report configuration.
///
/// Fails when `latest` has no tag to point at, or when neither endpoint
/// resolves to a commit.
pub fn build_config<R: CommandRunner>(runner: &R, options: &ConfigOptions) -> Result<ReportConfig> {
    let resolver = Resolver::new(runner);

    let diff = resolver.resolve(&Specifier::parse(&options.from))?;
    let report = resolver.resolve(&Specifier::parse(&options.till))?;

    if diff.commit.is_none() && report.commit.is_none() {
        return Err(ReportError::Resolution(format!(
            "neither `{}` nor `{}` resolves to a commit",
            options.from, options.till
        )));
    }

    let report_date = report
        .commit
        .as_deref()
        .and_then(|c| resolver.commit_date(c))
        .unwrap_or_default();

    info!(
        from = ?diff.tag,
        from_commit = ?diff.commit,
        till = ?report.tag,
        till_commit = ?report.commit,
        "resolved report range"
    );

    Ok(ReportConfig {
        title: options.title.clone(),
        only_deltas: options.only_deltas,
        repository_path: options.repository_path.clone(),
        report_tag: report.tag,
        diff_tag: diff.tag,
        commit: report.commit,
        diff_commit: diff.commit,
        report_date,
        release_tag: report.release_tag,
        release_diff_tag: diff.release_tag,
    })
}
