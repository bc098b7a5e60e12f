//! Graph API response models.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// One page of a Graph API collection response.
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    /// The page's records.
    pub data: Vec<T>,

    /// Pagination cursors; absent on the last page.
    pub paging: Option<Paging>,
}

/// Graph API pagination block.
#[derive(Debug, Clone, Deserialize)]
pub struct Paging {
    /// Absolute URL of the next page, if any.
    pub next: Option<String>,
}

/// An ad account reachable by the configured system user.
#[derive(Debug, Clone, Deserialize)]
pub struct AdAccount {
    /// Bare numeric account ID.
    pub account_id: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Account creation timestamp, e.g. `2015-03-02T11:00:00+0100`.
    /// Kept as the raw string; the Graph API's offset format is not
    /// RFC 3339.
    #[serde(default)]
    pub created_time: Option<String>,

    /// The account's UTC offset in hours; may be fractional.
    #[serde(default)]
    pub timezone_offset_hours_utc: Option<f64>,
}

impl AdAccount {
    /// The account's creation date, if the API reported a parseable one.
    #[must_use]
    pub fn created_date(&self) -> Option<NaiveDate> {
        let raw = self.created_time.as_deref()?;
        DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
            .ok()
            .map(|t| t.date_naive())
    }
}

/// An ad label attached to a campaign, ad set, or ad.
#[derive(Debug, Clone, Deserialize)]
pub struct AdLabel {
    /// Label text, conventionally `{key=value}`.
    pub name: String,
}

/// Campaign record for the account-structure export.
#[derive(Debug, Clone, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub adlabels: Option<Paged<AdLabel>>,
}

/// Ad-set record for the account-structure export.
#[derive(Debug, Clone, Deserialize)]
pub struct AdSet {
    pub id: String,
    pub name: String,
    pub campaign_id: String,
    #[serde(default)]
    pub adlabels: Option<Paged<AdLabel>>,
}

/// Ad record for the account-structure export.
#[derive(Debug, Clone, Deserialize)]
pub struct Ad {
    pub id: String,
    pub name: String,
    pub adset_id: String,
    #[serde(default)]
    pub adlabels: Option<Paged<AdLabel>>,
}

/// One row of the per-day, per-ad insights report.
///
/// The Graph API reports numeric measures as strings; parsing happens
/// where the row is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct Insight {
    /// First day of the reporting window (a single day for adpull).
    pub date_start: NaiveDate,

    /// The ad this row covers.
    pub ad_id: String,

    /// Impression count, as reported.
    pub impressions: String,

    /// Spend in the account currency, as reported.
    pub spend: String,

    /// Device breakdown value.
    pub impression_device: String,

    /// Action counts by action type.
    #[serde(default)]
    pub actions: Option<Vec<BTreeMap<String, serde_json::Value>>>,

    /// Action values by action type.
    #[serde(default)]
    pub action_values: Option<Vec<BTreeMap<String, serde_json::Value>>>,
}

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{([a-zA-Z|_]+)=([a-zA-Z|_]+)\}").expect("label pattern is valid")
    })
}

/// Extracts `{key=value}` attributes from ad labels into a map.
///
/// Keys are title-cased; labels that don't match the convention are
/// ignored.
#[must_use]
pub fn parse_labels(labels: &[AdLabel]) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    for label in labels {
        if let Some(captures) = label_pattern().captures(&label.name) {
            let key = title_case(captures[1].trim());
            let value = captures[2].trim().to_string();
            attributes.insert(key, value);
        }
    }
    attributes
}

fn title_case(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut at_word_start = true;
    for ch in lower.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    out
}
