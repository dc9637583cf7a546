use std::fmt;

/// A release tag decomposed as `<prefix><major>.<minor>.<patch><postfix>`.
///
/// Ordering is numeric on major, minor and patch, then lexicographic on the
/// postfix. The prefix only breaks ties between otherwise identical versions
/// (`v1.2.3` vs `release-1.2.3`) so that `Ord` stays consistent with `Eq`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub postfix: String,
    pub prefix: String,
}

impl SemanticVersion {
    /// Parses a tag, returning `None` for anything without a dotted numeric
    /// triple. Numbers too large for `u64` count as unparsable.
    pub fn parse(tag: &str) -> Option<Self> {
        let start = tag.find(|c: char| c.is_ascii_digit())?;
        let (prefix, rest) = tag.split_at(start);

        let (major, rest) = take_number(rest)?;
        let rest = rest.strip_prefix('.')?;
        let (minor, rest) = take_number(rest)?;
        let rest = rest.strip_prefix('.')?;
        let (patch, postfix) = take_number(rest)?;

        if postfix.contains('\n') {
            return None;
        }

        Some(Self {
            major,
            minor,
            patch,
            postfix: postfix.to_string(),
            prefix: prefix.to_string(),
        })
    }
}

fn take_number(input: &str) -> Option<(u64, &str)> {
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    let value = input[..end].parse().ok()?;
    Some((value, &input[end..]))
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}.{}.{}{}",
            self.prefix, self.major, self.minor, self.patch, self.postfix
        )
    }
}

/// Highest version among `tags` whose major equals `major`; unparsable tags
/// are skipped.
pub fn latest_of_major<'a, I>(tags: I, major: u64) -> Option<SemanticVersion>
where
    I: IntoIterator<Item = &'a str>,
{
    tags.into_iter()
        .filter_map(|t| SemanticVersion::parse(t.trim()))
        .filter(|v| v.major == major)
        .max()
}
