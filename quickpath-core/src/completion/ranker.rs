//! Filter/Ranker: case-insensitive prefix match, sort, truncate.

use crate::model::entry::{Entry, ResultSet};

use super::query::{Query, fold_for_match, reconstruct};

/// Select entries starting with `path` (ignoring case and separator
/// style), sort them
/// case-insensitively and keep the first `max_results`. When `command` is
/// set every survivor is re-prefixed with it and a space.
#[must_use]
pub fn filter(
    entries: &[Entry],
    path: &str,
    command: Option<&str>,
    max_results: usize,
) -> ResultSet {
    let needle: String = fold_for_match(path);

    let mut matches: Vec<(String, &Entry)> = entries
        .iter()
        .filter_map(|entry| {
            let folded = fold_for_match(entry);
            folded.starts_with(&needle).then_some((folded, entry))
        })
        .collect();

    // Fold first, then the original text so ties sort deterministically.
    matches.sort_unstable_by(|(fa, a), (fb, b)| fa.cmp(fb).then_with(|| a.cmp(b)));
    matches.truncate(max_results);

    let items = matches
        .into_iter()
        .map(|(_, entry)| reconstruct(command, entry))
        .collect();

    ResultSet::new(items)
}

/// Convenience wrapper taking the parsed query.
#[must_use]
pub fn filter_for_query(entries: &[Entry], query: &Query, max_results: usize) -> ResultSet {
    filter(entries, &query.path, query.command.as_deref(), max_results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(items: &[&str]) -> Vec<Entry> {
        items.iter().map(|s| Entry::from(*s)).collect()
    }

    #[test]
    fn test_prefix_filter_sorts_ignoring_case() {
        let all = entries(&[r"C:\Users\Bob", r"C:\Users\alice", r"C:\Users2"]);
        let result = filter(&all, r"C:\Users\", None, 15);
        assert_eq!(result.as_slice(), &[r"C:\Users\alice", r"C:\Users\Bob"]);
    }

    #[test]
    fn test_typed_case_is_ignored() {
        let all = entries(&["/srv/Data", "/srv/data2", "/srv/other"]);
        let result = filter(&all, "/SRV/DA", None, 15);
        assert_eq!(result.as_slice(), &["/srv/Data", "/srv/data2"]);
    }

    #[test]
    fn test_truncates_to_first_fifteen() {
        let names: Vec<String> = (0..30).rev().map(|i| format!("/d/f{i:02}")).collect();
        let all: Vec<Entry> = names.iter().map(|s| Entry::from(s.as_str())).collect();

        let result = filter(&all, "/d/", None, 15);
        assert_eq!(result.len(), 15);
        assert_eq!(result.get(0), Some("/d/f00"));
        assert_eq!(result.get(14), Some("/d/f14"));
    }

    #[test]
    fn test_command_prefix_is_reattached() {
        let all = entries(&[r"C:\Users\Bob"]);
        let result = filter(&all, r"C:\Users\", Some("notepad"), 15);
        assert_eq!(result.as_slice(), &[r"notepad C:\Users\Bob"]);
    }

    #[test]
    fn test_separator_style_does_not_hide_matches() {
        // Listed through a `/`-typed prefix, queried with `\`.
        let all = entries(&["C:/Users/Bob", "C:/Users/alice"]);
        let result = filter(&all, r"C:\Users\B", None, 15);
        assert_eq!(result.as_slice(), &["C:/Users/Bob"]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let all = entries(&["/a/b"]);
        assert!(filter(&all, "/c/", None, 15).is_empty());
    }
}
