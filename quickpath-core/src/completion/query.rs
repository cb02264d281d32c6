//! Input parsing: turns raw typed text into a [`Query`].
//!
//! Text is either a bare path or `<command> <path>`. Anything without a
//! separator or a drive-letter prefix is not path-like and never reaches
//! the cache or the enumerator.

use std::path::MAIN_SEPARATOR;

/// Both separators are accepted on every platform; entries produced by
/// enumeration use the native one.
#[must_use]
pub const fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

/// Rewrite `/` as `\\` on Windows so typed and enumerated text agree.
#[must_use]
pub fn native_separators(text: &str) -> String {
    if cfg!(windows) {
        text.replace('/', "\\")
    } else {
        text.to_string()
    }
}

/// Lowercased with every separator written as `/`, for comparisons only.
#[must_use]
pub fn fold_for_match(text: &str) -> String {
    text.chars()
        .map(|c| if is_separator(c) { '/' } else { c })
        .flat_map(char::to_lowercase)
        .collect()
}

/// `X:` at the start of the text.
#[must_use]
pub fn has_drive_prefix(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

#[must_use]
pub fn is_path_like(text: &str) -> bool {
    text.contains(is_separator) || has_drive_prefix(text)
}

/// True for the prefixes that also enumerate filesystem roots: empty, a
/// lone separator, or a bare drive root such as `C:\`.
#[must_use]
pub fn is_root_like(prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    if prefix.len() == 1 {
        return prefix.starts_with(is_separator);
    }
    has_drive_prefix(prefix)
        && prefix.len() <= 3
        && prefix[2..].chars().all(is_separator)
}

/// Split `<command> <path>` into its parts.
///
/// Text that already starts like a path is never split, so
/// `C:\Program Files\` stays whole. A split only happens when the part
/// after the first space is itself path-like.
#[must_use]
pub fn split_command(text: &str) -> (Option<&str>, &str) {
    if has_drive_prefix(text) || text.starts_with(is_separator) {
        return (None, text);
    }

    match text.split_once(' ') {
        Some((command, rest)) if !command.is_empty() => {
            let rest = rest.trim_start();
            if is_path_like(rest) {
                (Some(command), rest)
            } else {
                (None, text)
            }
        }
        _ => (None, text),
    }
}

/// Directory portion of a typed path, used as the cache/enumeration key.
#[must_use]
pub fn directory_prefix(path: &str) -> String {
    if let Some(idx) = path.rfind(is_separator) {
        return path[..=idx].to_string();
    }

    if has_drive_prefix(path) {
        return format!("{}{MAIN_SEPARATOR}", &path[..2]);
    }

    path.to_string()
}

/// Re-attach a command prefix to a path entry.
#[must_use]
pub fn reconstruct(command: Option<&str>, entry: &str) -> String {
    match command {
        Some(command) => format!("{command} {entry}"),
        None => entry.to_string(),
    }
}

/// One debounced (or accepted) request for completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw: String,
    pub command: Option<String>,
    pub path: String,
    pub prefix: String,
    pub generation: u64,
}

impl Query {
    /// Parse `raw`; `None` when the text is not path-like.
    #[must_use]
    pub fn parse(raw: &str, generation: u64, command_prefixes: bool) -> Option<Self> {
        let (command, path) = if command_prefixes {
            split_command(raw)
        } else {
            (None, raw)
        };

        if !is_path_like(path) {
            return None;
        }

        Some(Self {
            raw: raw.to_string(),
            command: command.map(str::to_string),
            path: path.to_string(),
            prefix: directory_prefix(path),
            generation,
        })
    }

    #[must_use]
    pub fn is_root_like(&self) -> bool {
        is_root_like(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_path_text_is_rejected() {
        assert!(Query::parse("github.com", 1, true).is_none());
        assert!(Query::parse("notepad", 1, true).is_none());
        assert!(Query::parse("ping example.org", 1, true).is_none());
        assert!(Query::parse("", 1, true).is_none());
    }

    #[test]
    fn test_command_prefix_split() {
        let q = Query::parse(r"notepad C:\Users\", 4, true).unwrap();
        assert_eq!(q.command.as_deref(), Some("notepad"));
        assert_eq!(q.path, r"C:\Users\");
        assert_eq!(q.prefix, r"C:\Users\");
        assert_eq!(q.generation, 4);
        assert_eq!(
            reconstruct(q.command.as_deref(), r"C:\Users\Bob"),
            r"notepad C:\Users\Bob"
        );
    }

    #[test]
    fn test_command_split_can_be_disabled() {
        let q = Query::parse("vim /etc/ho", 1, false).unwrap();
        assert_eq!(q.command, None);
        assert_eq!(q.path, "vim /etc/ho");
    }

    #[test]
    fn test_paths_with_spaces_are_not_split() {
        let q = Query::parse(r"C:\Program Files\Co", 1, true).unwrap();
        assert_eq!(q.command, None);
        assert_eq!(q.prefix, r"C:\Program Files\");

        let q = Query::parse("/home/me/My Documents/a", 1, true).unwrap();
        assert_eq!(q.command, None);
        assert_eq!(q.prefix, "/home/me/My Documents/");
    }

    #[test]
    fn test_directory_prefix_derivation() {
        assert_eq!(directory_prefix(r"C:\Users\Bo"), r"C:\Users\");
        assert_eq!(directory_prefix("/usr/lo"), "/usr/");
        assert_eq!(directory_prefix("/"), "/");
        assert_eq!(
            directory_prefix("D:"),
            format!("D:{MAIN_SEPARATOR}")
        );
    }

    #[test]
    fn test_root_like_prefixes() {
        assert!(is_root_like(""));
        assert!(is_root_like("/"));
        assert!(is_root_like(r"\"));
        assert!(is_root_like(r"C:\"));
        assert!(is_root_like("c:"));
        assert!(!is_root_like(r"C:\Users\"));
        assert!(!is_root_like("/usr/"));
    }

    #[test]
    fn test_fold_for_match_ignores_separator_style() {
        assert_eq!(fold_for_match(r"C:\Users/Bob"), "c:/users/bob");
        assert_eq!(fold_for_match(r"C:/USERS\b"), fold_for_match(r"c:\users\B"));
    }

    #[test]
    fn test_native_separators() {
        let converted = native_separators("C:/Users/");
        if cfg!(windows) {
            assert_eq!(converted, r"C:\Users\");
        } else {
            assert_eq!(converted, "C:/Users/");
        }
    }

    #[test]
    fn test_drive_pattern() {
        assert!(has_drive_prefix("c:"));
        assert!(has_drive_prefix(r"Z:\x"));
        assert!(!has_drive_prefix("1:"));
        assert!(!has_drive_prefix("ab:"));
    }
}
