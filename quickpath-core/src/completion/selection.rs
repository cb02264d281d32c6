//! Selection cursor over the current result set.

use crate::model::entry::ResultSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionCursor {
    index: Option<usize>,
}

impl SelectionCursor {
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    pub const fn reset(&mut self) {
        self.index = None;
    }

    /// Move by `delta`, clamped to the list. The first move from "no
    /// selection" lands on the first (down) or last (up) entry.
    pub fn move_by(&mut self, delta: isize, len: usize) -> Option<usize> {
        if len == 0 {
            self.index = None;
            return None;
        }

        let last = len - 1;
        let next = match self.index {
            None if delta >= 0 => delta.unsigned_abs().saturating_sub(1).min(last),
            None => last.saturating_sub(delta.unsigned_abs() - 1),
            Some(current) if delta >= 0 => current.saturating_add(delta.unsigned_abs()).min(last),
            Some(current) => current.saturating_sub(delta.unsigned_abs()),
        };

        self.index = Some(next);
        self.index
    }

    /// Carry the selection across a refreshed result set: keep pointing at
    /// the same text if it survived, otherwise clear.
    pub fn follow(&mut self, previous: &ResultSet, next: &ResultSet) {
        self.index = self
            .index
            .and_then(|i| previous.get(i))
            .and_then(|item| next.position(item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> ResultSet {
        ResultSet::new(items.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn test_moves_are_clamped() {
        let mut cursor = SelectionCursor::default();
        assert_eq!(cursor.move_by(1, 3), Some(0));
        assert_eq!(cursor.move_by(1, 3), Some(1));
        assert_eq!(cursor.move_by(10, 3), Some(2));
        assert_eq!(cursor.move_by(-10, 3), Some(0));
        assert_eq!(cursor.move_by(-1, 3), Some(0));
    }

    #[test]
    fn test_first_move_up_selects_last() {
        let mut cursor = SelectionCursor::default();
        assert_eq!(cursor.move_by(-1, 4), Some(3));
    }

    #[test]
    fn test_empty_list_clears() {
        let mut cursor = SelectionCursor::default();
        cursor.move_by(1, 2);
        assert_eq!(cursor.move_by(1, 0), None);
    }

    #[test]
    fn test_follow_tracks_surviving_item() {
        let before = set(&["/a", "/b", "/c"]);
        let after = set(&["/b", "/c"]);

        let mut cursor = SelectionCursor::default();
        cursor.move_by(2, before.len());
        assert_eq!(cursor.index(), Some(1));

        cursor.follow(&before, &after);
        assert_eq!(cursor.index(), Some(0));

        cursor.follow(&after, &set(&["/z"]));
        assert_eq!(cursor.index(), None);
    }
}
