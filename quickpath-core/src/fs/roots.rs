//! Filesystem roots and well-known warm-up locations.

use std::path::PathBuf;

use directories::UserDirs;

use crate::model::entry::Entry;

/// Existing drive roots (`A:\` .. `Z:\`).
#[cfg(windows)]
#[must_use]
pub fn filesystem_roots() -> Vec<Entry> {
    (b'A'..=b'Z')
        .map(|letter| format!("{}:\\", letter as char))
        .filter(|root| std::path::Path::new(root).exists())
        .map(Entry::from)
        .collect()
}

#[cfg(not(windows))]
#[must_use]
pub fn filesystem_roots() -> Vec<Entry> {
    vec![Entry::from("/")]
}

/// Root(s), home, desktop and documents, skipping anything missing.
#[must_use]
pub fn default_preload_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = filesystem_roots()
        .iter()
        .map(|root| PathBuf::from(root.as_ref()))
        .collect();

    if let Some(user) = UserDirs::new() {
        paths.push(user.home_dir().to_path_buf());
        paths.extend(user.desktop_dir().map(PathBuf::from));
        paths.extend(user.document_dir().map(PathBuf::from));
    }

    paths.dedup();
    paths
}
