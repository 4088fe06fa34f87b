//! `## Related` section parsing.
//!
//! Notes record accepted links in a trailing section:
//!
//! ```text
//! ## Related
//! - [Other Note](<folder/Other%20Note.md>)
//! ```
//!
//! The section runs from the `## Related` heading to the next `## `
//! heading or end of file. Either line ending is accepted. Link targets are
//! percent-decoded and normalized (`./a//b.md` is `a/b.md`). A pair counts
//! as already linked only when both notes list each other.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::canonical_pair;

static RELATED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## Related[ \t]*\r?$").unwrap());
static NEXT_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## ").unwrap());
static RELATED_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"- \[.*?\]\(<(.+?)>\)").unwrap());

/// Paths linked from the note's `## Related` section, in document order.
pub fn parse_related_links(content: &str) -> Vec<String> {
    let Some(heading) = RELATED_HEADING.find(content) else {
        return Vec::new();
    };
    let rest = &content[heading.end()..];
    let section = match NEXT_HEADING.find(rest) {
        Some(next) => &rest[..next.start()],
        None => rest,
    };

    RELATED_LINK
        .captures_iter(section)
        .map(|cap| {
            let raw = &cap[1];
            let decoded = urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            normalize_target(&decoded)
        })
        .collect()
}

/// Drop `.` segments and empty segments from a relative link target.
fn normalize_target(target: &str) -> String {
    let trimmed = target.trim();
    let absolute = trimmed.starts_with('/');
    let joined = trimmed
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Canonically ordered pairs where each note links to the other.
pub fn mutual_link_pairs(notes: &HashMap<String, String>) -> BTreeSet<(String, String)> {
    let link_map: HashMap<&str, HashSet<String>> = notes
        .iter()
        .filter_map(|(path, content)| {
            let links = parse_related_links(content);
            if links.is_empty() {
                None
            } else {
                Some((path.as_str(), links.into_iter().collect()))
            }
        })
        .collect();

    let mut pairs = BTreeSet::new();
    for (source, targets) in &link_map {
        for target in targets {
            let back_linked = link_map
                .get(target.as_str())
                .is_some_and(|back| back.contains(*source));
            if back_linked {
                let (a, b) = canonical_pair(source, target);
                pairs.insert((a.to_string(), b.to_string()));
            }
        }
    }
    pairs
}
