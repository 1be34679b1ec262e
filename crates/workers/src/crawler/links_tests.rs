// SPDX-License-Identifier: MIT

use super::*;
use yare::parameterized;

#[parameterized(
    no_patterns_pass = { "https://ex.com/a", &[], &[], true },
    include_match = { "https://ex.com/docs/a", &["^https://ex.com/docs/".to_string()], &[], true },
    include_miss = { "https://ex.com/blog/a", &["^https://ex.com/docs/".to_string()], &[], false },
    exclude_wins_over_include = {
        "https://ex.com/docs/a",
        &["^https://ex.com/docs/".to_string()],
        &["/a$".to_string()],
        false
    },
    exclude_only_blocks_match = { "https://ex.com/private/a", &[], &["private".to_string()], false },
)]
fn link_matches_cases(url: &str, include: &[String], exclude: &[String], expected: bool) {
    assert_eq!(link_matches(url, include, exclude), expected);
}

#[test]
fn empty_include_patterns_means_every_non_excluded_link_passes() {
    let links = vec!["https://ex.com/a".to_string(), "https://ex.com/b".to_string()];
    let (accepted, stats) = select_links(&links, &[], &[], 10);
    assert_eq!(accepted.len(), 2);
    assert_eq!(stats.followed, 2);
    assert_eq!(stats.filtered, 0);
}

#[test]
fn max_pages_zero_accepts_nothing() {
    let links = vec!["https://ex.com/a".to_string()];
    let (accepted, stats) = select_links(&links, &[], &[], 0);
    assert!(accepted.is_empty());
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.followed, 0);
}

#[test]
fn truncates_accepted_links_at_max_pages() {
    let links = (0..5).map(|i| format!("https://ex.com/{i}")).collect::<Vec<_>>();
    let (accepted, stats) = select_links(&links, &[], &[], 2);
    assert_eq!(accepted.len(), 2);
    assert_eq!(stats.followed, 2);
    assert_eq!(stats.skipped, 3);
    assert_eq!(stats.found, 5);
}

#[test]
fn invalid_regex_pattern_never_matches_rather_than_panicking() {
    assert!(!link_matches("https://ex.com/a", &["(unterminated".to_string()], &[]));
}
