//! Tagged text edits against a single source file.
//!
//! Edit computation returns a batch of [`Change`]s; callers decide which
//! kinds to apply. The setup operations are additive-only and stage
//! insertions through [`crate::tree::UpdateRecorder`].

use text_size::{TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;

/// A single computed edit, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Insert text at a byte offset.
    Insert(InsertChange),
    /// Remove a byte range.
    Remove(RemoveChange),
}

impl Change {
    /// Create an insertion.
    pub fn insert(pos: TextSize, text: impl Into<String>) -> Self {
        Self::Insert(InsertChange {
            pos,
            text: text.into(),
        })
    }

    /// Create a removal.
    pub fn remove(range: TextRange) -> Self {
        Self::Remove(RemoveChange { range })
    }
}

/// Text to be inserted at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertChange {
    pub pos: TextSize,
    pub text: String,
}

/// A byte range to be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveChange {
    pub range: TextRange,
}

/// Splice a batch of insertions into `base`.
///
/// Insertions are applied in ascending position order; the sort is stable,
/// so edits recorded earlier at the same position land first (insert-left
/// semantics).
pub fn apply_inserts(base: &str, inserts: &[InsertChange]) -> String {
    let mut ordered: Vec<&InsertChange> = inserts.iter().collect();
    ordered.sort_by_key(|c| c.pos);

    let added: usize = ordered.iter().map(|c| c.text.len()).sum();
    let mut out = String::with_capacity(base.len() + added);
    let mut cursor = 0usize;
    for change in ordered {
        let pos = usize::from(change.pos);
        debug_assert!(pos <= base.len(), "insert offset past end of file");
        out.push_str(&base[cursor..pos]);
        out.push_str(&change.text);
        cursor = pos;
    }
    out.push_str(&base[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_inserts_in_position_order() {
        let inserts = vec![
            InsertChange {
                pos: TextSize::new(5),
                text: ", world".to_string(),
            },
            InsertChange {
                pos: TextSize::new(0),
                text: ">> ".to_string(),
            },
        ];
        assert_eq!(apply_inserts("hello!", &inserts), ">> hello, world!");
    }

    #[test]
    fn equal_positions_keep_recording_order() {
        let inserts = vec![
            InsertChange {
                pos: TextSize::new(1),
                text: "b".to_string(),
            },
            InsertChange {
                pos: TextSize::new(1),
                text: "c".to_string(),
            },
        ];
        assert_eq!(apply_inserts("ad", &inserts), "abcd");
    }

    #[test]
    fn empty_batch_is_identity() {
        assert_eq!(apply_inserts("unchanged", &[]), "unchanged");
    }
}
