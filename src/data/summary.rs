//! Per-user record counts for the summary page.

use crate::data::{UserDirectory, ViewCatalog};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub slug: String,
    /// One entry per column; `None` when the metadata lacks that view.
    pub counts: Vec<Option<i64>>,
}

/// User by view table of record counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    /// Column headers, in catalog order.
    pub columns: Vec<String>,
    keys: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Build the table for every catalog view that at least one user has a
    /// count for.
    pub fn new(directory: &UserDirectory, views: &ViewCatalog) -> Self {
        let present: Vec<_> = views
            .views()
            .iter()
            .filter(|view| {
                directory
                    .users()
                    .iter()
                    .any(|user| user.records_for(&view.key).is_some())
            })
            .collect();

        let rows = directory
            .users()
            .iter()
            .map(|user| SummaryRow {
                slug: user.slug.clone(),
                counts: present.iter().map(|view| user.records_for(&view.key)).collect(),
            })
            .collect();

        Self {
            columns: present.iter().map(|view| view.label.clone()).collect(),
            keys: present.iter().map(|view| view.key.clone()).collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Column totals across all users.
    pub fn totals(&self) -> Vec<i64> {
        (0..self.keys.len())
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|row| row.counts[col])
                    .sum()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::UserEntry;

    fn entry(id: &str, counts: &[(&str, i64)]) -> UserEntry {
        let mut user = UserEntry::new(id);
        for (view, n) in counts {
            user.record_counts.insert(view.to_string(), *n);
        }
        user
    }

    #[test]
    fn columns_follow_catalog_and_skip_unknown_views() {
        let directory = UserDirectory::from_entries(vec![
            entry("demo-user-1", &[("sleep", 300), ("stress", 0), ("heart_rate", 2000)]),
            entry("0123456789abcdef0123", &[("sleep", 12), ("stress", 40), ("heart_rate", 150)]),
        ]);
        let table = SummaryTable::new(&directory, &ViewCatalog::default());

        assert_eq!(table.columns, vec!["Sleep", "BPM", "Stress"]);
        assert_eq!(table.rows[1].slug, "0123456");
        assert_eq!(table.rows[1].counts, vec![Some(12), Some(150), Some(40)]);
        assert_eq!(table.totals(), vec![312, 2150, 40]);
    }

    #[test]
    fn fallback_directory_has_no_columns() {
        let table = SummaryTable::new(
            &UserDirectory::fallback("demo-user-1"),
            &ViewCatalog::default(),
        );
        assert!(table.is_empty());
        assert!(table.totals().is_empty());
    }
}
