// SPDX-License-Identifier: MIT

//! Link include/exclude filtering.

use regex::Regex;

/// A link matches iff it satisfies any include pattern — or all links
/// pass if there are no include patterns — and no exclude pattern (spec
/// §4.E.1 step 7).
pub fn link_matches(url: &str, include_patterns: &[String], exclude_patterns: &[String]) -> bool {
    let included = include_patterns.is_empty()
        || include_patterns.iter().any(|p| regex_matches(p, url));
    if !included {
        return false;
    }
    !exclude_patterns.iter().any(|p| regex_matches(p, url))
}

fn regex_matches(pattern: &str, url: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(url),
        Err(_) => false,
    }
}

/// Filter-and-truncate `links` to at most `max_pages` accepted URLs,
/// returning `(accepted, stats)` where stats tracks found/filtered/
/// followed/skipped counts for the document's link-stat update (spec
/// §4.E.1 step 8).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub found: u64,
    pub filtered: u64,
    pub followed: u64,
    pub skipped: u64,
}

pub fn select_links(
    links: &[String],
    include_patterns: &[String],
    exclude_patterns: &[String],
    max_pages: u32,
) -> (Vec<String>, LinkStats) {
    let mut stats = LinkStats { found: links.len() as u64, ..Default::default() };
    let mut accepted = Vec::new();

    for url in links {
        if !link_matches(url, include_patterns, exclude_patterns) {
            stats.filtered += 1;
            continue;
        }
        if accepted.len() as u32 >= max_pages {
            stats.skipped += 1;
            continue;
        }
        accepted.push(url.clone());
        stats.followed += 1;
    }

    (accepted, stats)
}

#[cfg(test)]
#[path = "links_tests.rs"]
mod tests;
