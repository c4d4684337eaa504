//! Identifier index built from flat parent/child tables.
//!
//! Each input row carries an identifier and its immediate parent, and
//! optionally a label and an integer sort key. The index applies a
//! first-write-wins policy: once an identifier's parent (or label, or
//! sort key) is recorded, later conflicting rows are logged and
//! ignored. All maps are owned by the index instance, so independent
//! resolution runs never share state.

use std::collections::HashMap;

use tracing::warn;

/// Flat parent/label/sort-key maps for one resolution run.
#[derive(Debug, Default)]
pub struct IdentIndex {
    parent: HashMap<String, String>,
    label: HashMap<String, String>,
    sort: HashMap<String, i64>,
    has_four_columns: bool,
}

impl IdentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tab-delimited input row.
    ///
    /// Accepts exactly 2 columns (`id`, `parent`) or 4 columns (`id`,
    /// `parent`, `label`, `sortKey`); anything else is a non-fatal
    /// row-level error. A row for an identifier whose parent is already
    /// recorded is ignored in full, with a conflict warning when the
    /// new parent differs from the recorded one.
    pub fn add_row(&mut self, line: &str, row: usize) {
        let cols: Vec<&str> = line.split('\t').collect();

        let (id, parent, label, sort_key) = match cols.as_slice() {
            [id, parent] => (*id, *parent, "", ""),
            [id, parent, label, sort_key] => {
                self.has_four_columns = true;
                (*id, *parent, *label, *sort_key)
            }
            _ => {
                warn!(row, columns = cols.len(), "row does not have 2 or 4 columns");
                return;
            }
        };

        if let Some(recorded) = self.parent.get(id) {
            if recorded != parent {
                warn!(
                    row,
                    id,
                    recorded_parent = %recorded,
                    new_parent = %parent,
                    "conflicting parent assignment, keeping first value"
                );
            }
            return;
        }

        if !parent.is_empty() {
            self.parent.insert(id.to_string(), parent.to_string());
        }

        if !label.is_empty() {
            match self.label.get(id) {
                Some(recorded) => {
                    if recorded != label {
                        warn!(
                            row,
                            id,
                            recorded_label = %recorded,
                            new_label = %label,
                            "conflicting label, keeping first value"
                        );
                    }
                }
                None => {
                    self.label.insert(id.to_string(), label.to_string());
                }
            }
        }

        if !sort_key.is_empty() {
            // Non-integer sort keys are ignored without diagnostic.
            if let Ok(value) = sort_key.parse::<i64>() {
                match self.sort.get(id) {
                    Some(recorded) => {
                        if *recorded != value {
                            warn!(
                                row,
                                id,
                                recorded_sort = recorded,
                                new_sort = value,
                                "conflicting sort key, keeping first value"
                            );
                        }
                    }
                    None => {
                        self.sort.insert(id.to_string(), value);
                    }
                }
            }
        }
    }

    /// The recorded parent of an identifier, if any.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parent.get(id).map(String::as_str)
    }

    /// The recorded label of an identifier, or the empty string.
    pub fn label_of(&self, id: &str) -> &str {
        self.label.get(id).map(String::as_str).unwrap_or("")
    }

    /// The recorded sort key of an identifier, defaulting to 0.
    pub fn sort_of(&self, id: &str) -> i64 {
        self.sort.get(id).copied().unwrap_or(0)
    }

    /// True if any 4-column row was seen in the input.
    pub fn has_four_columns(&self) -> bool {
        self.has_four_columns
    }

    /// Every identifier that was ever assigned a parent. Iteration
    /// order is implementation-defined.
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.parent.keys()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::count_warnings;

    #[test]
    fn records_two_column_rows() {
        let mut index = IdentIndex::new();
        index.add_row("b\ta", 1);
        index.add_row("c\tb", 2);

        assert_eq!(index.parent_of("b"), Some("a"));
        assert_eq!(index.parent_of("c"), Some("b"));
        assert!(!index.has_four_columns());
    }

    #[test]
    fn records_four_column_rows() {
        let mut index = IdentIndex::new();
        index.add_row("gene1\tchr1\tgene\t2", 1);

        assert_eq!(index.parent_of("gene1"), Some("chr1"));
        assert_eq!(index.label_of("gene1"), "gene");
        assert_eq!(index.sort_of("gene1"), 2);
        assert!(index.has_four_columns());
    }

    #[test]
    fn skips_rows_with_wrong_column_count() {
        let mut index = IdentIndex::new();
        index.add_row("only-one", 1);
        index.add_row("a\tb\tc", 2);
        index.add_row("a\tb\tc\td\te", 3);

        assert_eq!(index.ids().count(), 0);
    }

    #[test]
    fn first_parent_wins_on_conflict() {
        let (_guard, warnings) = count_warnings();

        let mut index = IdentIndex::new();
        index.add_row("x\tfirst", 1);
        index.add_row("x\tsecond", 2);

        assert_eq!(index.parent_of("x"), Some("first"));
        assert_eq!(warnings.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn duplicate_row_is_ignored_entirely() {
        let (_guard, warnings) = count_warnings();

        let mut index = IdentIndex::new();
        index.add_row("x\tp\tlbl\t1", 1);
        // Parent already recorded: label and sort of this row are dropped too.
        index.add_row("x\tp\tother\t9", 2);

        assert_eq!(index.label_of("x"), "lbl");
        assert_eq!(index.sort_of("x"), 1);
        // Same parent repeated is not a conflict.
        assert_eq!(warnings.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn label_and_sort_conflicts_keep_first_values() {
        let (_guard, warnings) = count_warnings();

        let mut index = IdentIndex::new();
        // Empty parent leaves the id unrecorded, so the second row is
        // not short-circuited and reaches the label and sort checks.
        index.add_row("x\t\tlbl1\t1", 1);
        index.add_row("x\tp\tlbl2\t2", 2);

        assert_eq!(index.parent_of("x"), Some("p"));
        assert_eq!(index.label_of("x"), "lbl1");
        assert_eq!(index.sort_of("x"), 1);
        // One diagnostic for the label, one for the sort key.
        assert_eq!(warnings.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn empty_parent_is_not_recorded() {
        let mut index = IdentIndex::new();
        index.add_row("root\t", 1);
        // No parent recorded, so a later row may still set one.
        index.add_row("root\tactual", 2);

        assert_eq!(index.parent_of("root"), Some("actual"));
    }

    #[test]
    fn non_integer_sort_key_is_ignored() {
        let mut index = IdentIndex::new();
        index.add_row("x\tp\tlbl\tnot-a-number", 1);
        assert_eq!(index.sort_of("x"), 0);
    }

    #[test]
    fn mixed_row_widths_are_accepted() {
        let mut index = IdentIndex::new();
        index.add_row("a\t-", 1);
        index.add_row("b\ta\tgene\t3", 2);

        assert_eq!(index.parent_of("a"), Some("-"));
        assert_eq!(index.parent_of("b"), Some("a"));
        assert!(index.has_four_columns());
    }
}
