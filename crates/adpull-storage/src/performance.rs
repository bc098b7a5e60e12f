//! Per-day ad performance upsert.

use crate::layout::ensure_parent_dir;
use adpull_core::{AdpullError, AdpullResult};
use adpull_insights::Insight;
use chrono::NaiveDate;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const CREATE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS ad_performance (
  date          DATE   NOT NULL,
  ad_id         BIGINT NOT NULL,
  device        TEXT   NOT NULL,
  performance   TEXT   NOT NULL,
  PRIMARY KEY (ad_id, device)
);";

const UPSERT_ROW: &str =
    "INSERT OR REPLACE INTO ad_performance (date, ad_id, device, performance) VALUES (?, ?, ?, ?)";

/// One row of the `ad_performance` table.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    pub date: NaiveDate,
    pub ad_id: i64,
    pub device: String,
    /// JSON blob with impressions, spend, actions, and action values.
    pub performance: String,
}

impl PerformanceRow {
    /// Shapes one insights record into a table row.
    ///
    /// # Errors
    ///
    /// `AdpullError::Internal` when a numeric measure the API reports as
    /// a string does not parse.
    pub fn from_insight(insight: &Insight) -> AdpullResult<Self> {
        let impressions: i64 = insight.impressions.parse().map_err(|_| {
            AdpullError::internal(format!(
                "unparseable impressions {:?} for ad {}",
                insight.impressions, insight.ad_id
            ))
        })?;
        let spend: f64 = insight.spend.parse().map_err(|_| {
            AdpullError::internal(format!(
                "unparseable spend {:?} for ad {}",
                insight.spend, insight.ad_id
            ))
        })?;
        let ad_id: i64 = insight.ad_id.parse().map_err(|_| {
            AdpullError::internal(format!("unparseable ad id {:?}", insight.ad_id))
        })?;

        let actions: Vec<Value> = insight
            .actions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(floatify_values)
            .collect();
        let action_values: Vec<Value> = insight
            .action_values
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(floatify_values)
            .collect();

        let performance = json!({
            "impressions": impressions,
            "spend": spend,
            "actions": actions,
            "action_values": action_values,
        });

        Ok(Self {
            date: insight.date_start,
            ad_id,
            device: insight.impression_device.clone(),
            performance: performance.to_string(),
        })
    }
}

/// Parses numeric-looking strings in a breakdown record to numbers,
/// leaving everything else untouched.
fn floatify_values(record: &BTreeMap<String, Value>) -> Value {
    let shaped: serde_json::Map<String, Value> = record
        .iter()
        .map(|(key, value)| (key.clone(), floatify(value)))
        .collect();
    Value::Object(shaped)
}

fn floatify(value: &Value) -> Value {
    if let Value::String(s) = value {
        if let Ok(parsed) = s.parse::<f64>() {
            if let Some(number) = serde_json::Number::from_f64(parsed) {
                return Value::Number(number);
            }
        }
    }
    value.clone()
}

/// Creates the per-day database if needed and upserts `rows` into it.
///
/// The table is keyed on (ad, device), so re-running a day replaces its
/// rows instead of duplicating them.
pub async fn upsert_performance(db_path: &Path, rows: &[PerformanceRow]) -> AdpullResult<()> {
    ensure_parent_dir(db_path).await?;

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .map_err(|e| AdpullError::storage(format!("open {}: {e}", db_path.display())))?;

    sqlx::query(CREATE_TABLE)
        .execute(&mut conn)
        .await
        .map_err(|e| AdpullError::storage(format!("create ad_performance: {e}")))?;

    let mut tx = conn
        .begin()
        .await
        .map_err(|e| AdpullError::storage(format!("begin transaction: {e}")))?;
    for row in rows {
        sqlx::query(UPSERT_ROW)
            .bind(row.date)
            .bind(row.ad_id)
            .bind(&row.device)
            .bind(&row.performance)
            .execute(&mut *tx)
            .await
            .map_err(|e| AdpullError::storage(format!("upsert ad {}: {e}", row.ad_id)))?;
    }
    tx.commit()
        .await
        .map_err(|e| AdpullError::storage(format!("commit: {e}")))?;
    conn.close()
        .await
        .map_err(|e| AdpullError::storage(format!("close {}: {e}", db_path.display())))?;

    debug!(rows = rows.len(), db = %db_path.display(), "ad performance upserted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    fn insight(ad_id: &str, device: &str) -> Insight {
        serde_json::from_value(json!({
            "date_start": "2024-01-05",
            "ad_id": ad_id,
            "impressions": "1000",
            "spend": "12.34",
            "impression_device": device,
            "actions": [{"action_type": "link_click", "value": "7"}],
            "action_values": [{"action_type": "purchase", "value": "99.9"}]
        }))
        .expect("valid insight")
    }

    #[test]
    fn test_row_shaping_parses_measures() {
        let row = PerformanceRow::from_insight(&insight("42", "iphone")).expect("row shapes");
        assert_eq!(row.ad_id, 42);
        let blob: Value = serde_json::from_str(&row.performance).expect("valid json");
        assert_eq!(blob["impressions"], json!(1000));
        assert_eq!(blob["spend"], json!(12.34));
        assert_eq!(blob["actions"][0]["value"], json!(7.0));
    }

    #[test]
    fn test_row_shaping_rejects_bad_numbers() {
        let mut bad = insight("42", "iphone");
        bad.impressions = "lots".to_string();
        assert!(PerformanceRow::from_insight(&bad).is_err());
    }

    #[test]
    fn test_floatify_leaves_non_numeric_strings() {
        let record: BTreeMap<String, Value> = serde_json::from_value(json!({
            "action_type": "link_click",
            "value": "7"
        }))
        .expect("valid record");
        let shaped = floatify_values(&record);
        assert_eq!(shaped["action_type"], json!("link_click"));
        assert_eq!(shaped["value"], json!(7.0));
    }

    #[tokio::test]
    async fn test_upsert_creates_database_and_replaces_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("2024/01/05/facebook/ad-performance-act_1.sqlite3");

        let first = PerformanceRow::from_insight(&insight("42", "iphone")).expect("row");
        upsert_performance(&db_path, &[first]).await.expect("first upsert");

        // Same (ad, device) key: the row must be replaced, not duplicated.
        let mut updated = insight("42", "iphone");
        updated.impressions = "2000".to_string();
        let second = PerformanceRow::from_insight(&updated).expect("row");
        upsert_performance(&db_path, &[second]).await.expect("second upsert");

        let options = SqliteConnectOptions::new().filename(&db_path);
        let mut conn = SqliteConnection::connect_with(&options).await.expect("open");
        let row = sqlx::query("SELECT COUNT(*) AS n, MAX(performance) AS p FROM ad_performance")
            .fetch_one(&mut conn)
            .await
            .expect("count query");
        let count: i64 = row.get("n");
        let performance: String = row.get("p");
        assert_eq!(count, 1);
        assert!(performance.contains("2000"));
    }
}
