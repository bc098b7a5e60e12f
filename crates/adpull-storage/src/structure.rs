//! Account-structure TSV export.

use crate::layout::{account_structure_path, ensure_parent_dir};
use adpull_core::AdpullResult;
use std::path::{Path, PathBuf};
use tracing::info;

/// Column header of the account-structure export.
pub const STRUCTURE_HEADER: [&str; 9] = [
    "Ad Id",
    "Ad",
    "Ad Set Id",
    "Ad Set",
    "Campaign Id",
    "Campaign",
    "Account Id",
    "Account",
    "Attributes",
];

/// One flat row of the account-structure export, one per ad.
#[derive(Debug, Clone)]
pub struct AccountStructureRow {
    pub ad_id: String,
    pub ad_name: String,
    pub ad_set_id: String,
    pub ad_set_name: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub account_id: String,
    pub account_name: String,
    /// Merged `{key=value}` label attributes as a JSON object.
    pub attributes: String,
}

impl AccountStructureRow {
    fn to_tsv_line(&self) -> String {
        [
            &self.ad_id,
            &self.ad_name,
            &self.ad_set_id,
            &self.ad_set_name,
            &self.campaign_id,
            &self.campaign_name,
            &self.account_id,
            &self.account_name,
            &self.attributes,
        ]
        .map(|field| sanitize(field))
        .join("\t")
    }
}

/// Tabs and newlines would break the format; collapse them to spaces.
fn sanitize(field: &str) -> String {
    field.replace(['\t', '\n', '\r'], " ")
}

/// Writes the account-structure export for all accounts.
///
/// The file is written to a temporary sibling first and renamed into
/// place so a crashed export never leaves a half-written file behind.
pub async fn write_account_structure(
    data_dir: &Path,
    rows: &[AccountStructureRow],
) -> AdpullResult<PathBuf> {
    let final_path = account_structure_path(data_dir);
    ensure_parent_dir(&final_path).await?;

    let mut contents = String::new();
    contents.push_str(&STRUCTURE_HEADER.join("\t"));
    contents.push('\n');
    for row in rows {
        contents.push_str(&row.to_tsv_line());
        contents.push('\n');
    }

    let tmp_path = final_path.with_extension("tsv.tmp");
    tokio::fs::write(&tmp_path, contents).await?;
    tokio::fs::rename(&tmp_path, &final_path).await?;

    info!(rows = rows.len(), file = %final_path.display(), "account structure written");
    Ok(final_path)
}
