use crate::error::Result;
use std::path::Path;

pub const DEFAULT_FILE: &str = "CHANGELOG.md";

/// Where an excerpt starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Start<'a> {
    /// First second-level heading, whatever its title.
    FirstHeading,
    /// Heading of a released version, `## [<tag>]`.
    Release(&'a str),
}

pub fn read<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// Lines from the `start` heading up to, not including, the `## [<until>]`
/// heading. No `until` means the rest of the document; a missing start
/// heading yields nothing.
pub fn excerpt(document: &str, start: Start<'_>, until: Option<&str>) -> Vec<String> {
    let start_marker = match start {
        Start::FirstHeading => "##".to_string(),
        Start::Release(tag) => release_heading(tag),
    };
    let end_marker = until.map(release_heading);

    document
        .lines()
        .skip_while(|line| !line.starts_with(&start_marker))
        .take_while(|line| match &end_marker {
            Some(marker) => !line.starts_with(marker.as_str()),
            None => true,
        })
        .map(str::to_string)
        .collect()
}

fn release_heading(tag: &str) -> String {
    format!("## [{tag}]")
}
