//! Data-directory layout.
//!
//! Results live under a date-sharded tree:
//!
//! ```text
//! {data_dir}/2024/01/05/facebook/ad-performance-act_123.sqlite3
//! {data_dir}/facebook-account-structure_v1.tsv
//! ```

use adpull_core::{AccountId, AdpullResult};
use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};

/// Version tag carried in output filenames, bumped on format changes.
pub const OUTPUT_FILE_VERSION: &str = "v1";

/// Path of the per-day performance database for one account.
#[must_use]
pub fn performance_db_path(data_dir: &Path, date: NaiveDate, account_id: &AccountId) -> PathBuf {
    data_dir
        .join(format!(
            "{:04}/{:02}/{:02}/facebook",
            date.year(),
            date.month(),
            date.day()
        ))
        .join(format!("ad-performance-act_{account_id}.sqlite3"))
}

/// Path of the account-structure export.
#[must_use]
pub fn account_structure_path(data_dir: &Path) -> PathBuf {
    data_dir.join(format!(
        "facebook-account-structure_{OUTPUT_FILE_VERSION}.tsv"
    ))
}

/// Creates the parent directory of `path` if it does not exist yet.
pub async fn ensure_parent_dir(path: &Path) -> AdpullResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performance_db_path_is_date_sharded() {
        let path = performance_db_path(
            Path::new("/data"),
            "2024-01-05".parse().expect("valid date"),
            &AccountId::new("123"),
        );
        assert_eq!(
            path,
            PathBuf::from("/data/2024/01/05/facebook/ad-performance-act_123.sqlite3")
        );
    }

    #[test]
    fn test_account_structure_path_is_versioned() {
        let path = account_structure_path(Path::new("/data"));
        assert_eq!(
            path,
            PathBuf::from("/data/facebook-account-structure_v1.tsv")
        );
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_creates_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a/b/c/file.sqlite3");
        ensure_parent_dir(&nested).await.expect("mkdir succeeds");
        assert!(nested.parent().expect("has parent").is_dir());
    }
}
