//! User Metadata Loader
//! Reads `user_metadata.csv` with Polars to fill the user selector.
//!
//! Expected columns: `user_full`, `user` (short slug, optional) and one
//! record-count column per view (`sleep`, `heart_rate`, ...).

use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FULL_ID_COLUMN: &str = "user_full";
const SLUG_COLUMN: &str = "user";

/// Ids longer than this are shown by their first `SLUG_LEN` characters.
const MAX_UNSHORTENED_LEN: usize = 15;
const SLUG_LEN: usize = 7;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to load user metadata: {0}")]
    CsvError(#[from] PolarsError),
    #[error("User metadata has no `{0}` column")]
    MissingColumn(&'static str),
}

/// One user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    /// Value sent as the `user` query parameter.
    pub full_id: String,
    /// Short label shown in the selector.
    pub slug: String,
    /// Records available per view key.
    pub record_counts: BTreeMap<String, i64>,
}

impl UserEntry {
    pub fn new(full_id: impl Into<String>) -> Self {
        let full_id = full_id.into();
        Self {
            slug: slug_for(&full_id),
            full_id,
            record_counts: BTreeMap::new(),
        }
    }

    /// Records for a view; `None` when the metadata has no such column.
    pub fn records_for(&self, view: &str) -> Option<i64> {
        self.record_counts.get(view).copied()
    }
}

/// Users available to the user selector.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<UserEntry>,
    file_path: Option<PathBuf>,
}

impl UserDirectory {
    pub fn from_entries(users: Vec<UserEntry>) -> Self {
        Self {
            users,
            file_path: None,
        }
    }

    /// Directory holding only `default_user`, used when no metadata loads.
    pub fn fallback(default_user: &str) -> Self {
        Self::from_entries(vec![UserEntry::new(default_user)])
    }

    /// Load the metadata CSV using Polars.
    pub fn load_csv(file_path: &Path) -> Result<Self, MetadataError> {
        let path_str = file_path.to_string_lossy().to_string();

        let df = LazyCsvReader::new(&path_str)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        let users = Self::entries_from_dataframe(&df)?;
        tracing::info!(path = %file_path.display(), users = users.len(), "Loaded user metadata");

        Ok(Self {
            users,
            file_path: Some(file_path.to_path_buf()),
        })
    }

    fn entries_from_dataframe(df: &DataFrame) -> Result<Vec<UserEntry>, MetadataError> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if !columns.iter().any(|c| c == FULL_ID_COLUMN) {
            return Err(MetadataError::MissingColumn(FULL_ID_COLUMN));
        }

        let full_ids = string_values(df, FULL_ID_COLUMN)?;
        let slugs = if columns.iter().any(|c| c == SLUG_COLUMN) {
            string_values(df, SLUG_COLUMN)?
        } else {
            vec![None; df.height()]
        };

        let mut counts: Vec<(String, Vec<Option<i64>>)> = Vec::new();
        for name in columns
            .iter()
            .filter(|c| *c != FULL_ID_COLUMN && *c != SLUG_COLUMN)
        {
            let as_int = df.column(name)?.cast(&DataType::Int64)?;
            let ca = as_int.i64()?;
            counts.push((name.clone(), (0..df.height()).map(|i| ca.get(i)).collect()));
        }

        let users = full_ids
            .into_iter()
            .enumerate()
            .filter_map(|(i, full_id)| {
                let full_id = full_id?;
                let slug = slugs
                    .get(i)
                    .cloned()
                    .flatten()
                    .unwrap_or_else(|| slug_for(&full_id));
                let record_counts = counts
                    .iter()
                    .map(|(view, values)| (view.clone(), values[i].unwrap_or(0)))
                    .collect();
                Some(UserEntry {
                    full_id,
                    slug,
                    record_counts,
                })
            })
            .collect();
        Ok(users)
    }

    pub fn users(&self) -> &[UserEntry] {
        &self.users
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, full_id: &str) -> Option<&UserEntry> {
        self.users.iter().find(|u| u.full_id == full_id)
    }

    /// Users with at least one record in every listed view.
    pub fn users_with_records(&self, views: &[&str]) -> Vec<&UserEntry> {
        self.users
            .iter()
            .filter(|user| {
                views
                    .iter()
                    .all(|view| user.records_for(view).is_some_and(|n| n > 0))
            })
            .collect()
    }

    /// Whether a user is known to lack records for a view. Unknown users or
    /// views are not flagged.
    pub fn lacks_records(&self, full_id: &str, view: &str) -> bool {
        self.get(full_id)
            .and_then(|user| user.records_for(view))
            .is_some_and(|n| n <= 0)
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

/// Short display id: long ids keep their first few characters.
pub fn slug_for(full_id: &str) -> String {
    if full_id.chars().count() > MAX_UNSHORTENED_LEN {
        full_id.chars().take(SLUG_LEN).collect()
    } else {
        full_id.to_string()
    }
}

fn string_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, MetadataError> {
    let series = df.column(column)?;
    Ok((0..df.height())
        .map(|i| {
            let val = series.get(i).ok()?;
            if val.is_null() {
                None
            } else {
                Some(val.to_string().trim_matches('"').to_string())
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CSV: &str = "\
user_full,user,blood_oxygenation,heart_rate,sleep,stress
demo-user-1,demo-user-1,10,2000,300,0
0123456789abcdef0123,0123456,0,150,12,40
";

    fn write_csv(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_metadata.csv");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_users_and_record_counts() {
        let (_dir, path) = write_csv(CSV);
        let directory = UserDirectory::load_csv(&path).unwrap();

        assert_eq!(directory.users().len(), 2);
        let demo = directory.get("demo-user-1").unwrap();
        assert_eq!(demo.slug, "demo-user-1");
        assert_eq!(demo.records_for("heart_rate"), Some(2000));
        assert_eq!(demo.records_for("weekly"), None);
        assert_eq!(directory.file_path(), Some(&path));
    }

    #[test]
    fn filters_users_by_view_pair() {
        let (_dir, path) = write_csv(CSV);
        let directory = UserDirectory::load_csv(&path).unwrap();

        let both: Vec<&str> = directory
            .users_with_records(&["sleep", "stress"])
            .iter()
            .map(|u| u.full_id.as_str())
            .collect();
        assert_eq!(both, vec!["0123456789abcdef0123"]);
        assert_eq!(directory.users_with_records(&[]).len(), 2);
        assert!(directory.lacks_records("0123456789abcdef0123", "blood_oxygenation"));
        assert!(!directory.lacks_records("demo-user-1", "blood_oxygenation"));
        assert!(!directory.lacks_records("nobody", "sleep"));
    }

    #[test]
    fn derives_slug_when_column_missing() {
        let (_dir, path) = write_csv("user_full,sleep\n0123456789abcdef0123,4\nshort-id,0\n");
        let directory = UserDirectory::load_csv(&path).unwrap();
        assert_eq!(directory.users()[0].slug, "0123456");
        assert_eq!(directory.users()[1].slug, "short-id");
    }

    #[test]
    fn requires_full_id_column() {
        let (_dir, path) = write_csv("user,sleep\nabc,1\n");
        let err = UserDirectory::load_csv(&path).unwrap_err();
        assert!(matches!(err, MetadataError::MissingColumn("user_full")));
    }

    #[test]
    fn fallback_holds_default_user() {
        let directory = UserDirectory::fallback("demo-user-1");
        assert_eq!(directory.users().len(), 1);
        assert_eq!(directory.users()[0].full_id, "demo-user-1");
        assert!(directory.users()[0].record_counts.is_empty());
    }

    #[test]
    fn slug_keeps_short_ids() {
        assert_eq!(slug_for("abcdefghijklmno"), "abcdefghijklmno");
        assert_eq!(slug_for("abcdefghijklmnop"), "abcdefg");
    }
}
