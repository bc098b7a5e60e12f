//! Graph API client with pagination and error classification.

use crate::models::{Ad, AdAccount, AdSet, Campaign, Insight, Paged};
use adpull_core::{AccountId, AdpullError, AdpullResult};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// The Graph API error code for "User request limit reached".
const RATE_LIMIT_CODE: i64 = 17;

/// Page size for collection requests.
const PAGE_LIMIT: u32 = 1000;

/// Statuses the insights report must include; by default the API only
/// considers active campaigns.
const EFFECTIVE_STATUSES: &[&str] = &[
    "ACTIVE",
    "PAUSED",
    "PENDING_REVIEW",
    "DISAPPROVED",
    "PREAPPROVED",
    "PENDING_BILLING_INFO",
    "CAMPAIGN_PAUSED",
    "ARCHIVED",
    "ADSET_PAUSED",
];

/// Connection settings for [`GraphClient`].
#[derive(Debug, Clone)]
pub struct GraphClientConfig {
    /// API host, overridable for tests.
    pub base_url: String,

    /// Graph API version segment, e.g. `v19.0`.
    pub api_version: String,

    /// System-user access token with `read_insights` and `ads_read`.
    pub access_token: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GraphClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graph.facebook.com".to_string(),
            api_version: "v19.0".to_string(),
            access_token: String::new(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Envelope the Graph API wraps errors in.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Facebook Graph API client.
///
/// All collection endpoints paginate; the client follows `paging.next`
/// URLs until exhausted and returns the concatenated records.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
    access_token: String,
}

impl GraphClient {
    /// Builds a client from connection settings.
    ///
    /// # Errors
    ///
    /// `AdpullError::Configuration` when the base URL is unparseable or
    /// the HTTP client cannot be constructed.
    pub fn new(config: &GraphClientConfig) -> AdpullResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AdpullError::configuration(format!("invalid API base URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AdpullError::configuration(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            http,
            base_url,
            api_version: config.api_version.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Lists the ad accounts reachable by `user` (usually `me`).
    pub async fn ad_accounts(&self, user: &str) -> AdpullResult<Vec<AdAccount>> {
        info!(user, "listing ad accounts");
        self.get_all(
            &format!("{user}/adaccounts"),
            &[(
                "fields",
                "account_id,name,created_time,timezone_offset_hours_utc".to_string(),
            )],
        )
        .await
    }

    /// Downloads the ad-level performance report of one account for one
    /// day, broken down by impression device and action type.
    pub async fn insights(
        &self,
        account_id: &AccountId,
        date: NaiveDate,
    ) -> AdpullResult<Vec<Insight>> {
        debug!(account = %account_id, %date, "downloading ad performance");
        let day = date.format("%Y-%m-%d").to_string();
        let params = [
            (
                "fields",
                "date_start,ad_id,impressions,actions,spend,action_values".to_string(),
            ),
            (
                "action_attribution_windows",
                json!(["28d_click"]).to_string(),
            ),
            ("action_breakdowns", json!(["action_type"]).to_string()),
            ("breakdowns", json!(["impression_device"]).to_string()),
            ("level", "ad".to_string()),
            (
                "time_range",
                json!({ "since": day, "until": day }).to_string(),
            ),
            (
                "filtering",
                json!([{
                    "field": "ad.effective_status",
                    "operator": "IN",
                    "value": EFFECTIVE_STATUSES,
                }])
                .to_string(),
            ),
        ];
        self.get_all(&format!("{}/insights", account_id.as_act()), &params)
            .await
    }

    /// Lists an account's campaigns with their labels.
    pub async fn campaigns(&self, account_id: &AccountId) -> AdpullResult<Vec<Campaign>> {
        debug!(account = %account_id, "listing campaigns");
        self.get_structure(account_id, "campaigns", "id,name,adlabels")
            .await
    }

    /// Lists an account's ad sets with their campaign links and labels.
    pub async fn ad_sets(&self, account_id: &AccountId) -> AdpullResult<Vec<AdSet>> {
        debug!(account = %account_id, "listing ad sets");
        self.get_structure(account_id, "adsets", "id,name,campaign_id,adlabels")
            .await
    }

    /// Lists an account's ads with their ad-set links and labels.
    pub async fn ads(&self, account_id: &AccountId) -> AdpullResult<Vec<Ad>> {
        debug!(account = %account_id, "listing ads");
        self.get_structure(account_id, "ads", "id,name,adset_id,adlabels")
            .await
    }

    async fn get_structure<T: DeserializeOwned>(
        &self,
        account_id: &AccountId,
        collection: &str,
        fields: &str,
    ) -> AdpullResult<Vec<T>> {
        let params = [
            ("fields", fields.to_string()),
            (
                "effective_status",
                json!(["ACTIVE", "PAUSED", "ARCHIVED"]).to_string(),
            ),
        ];
        self.get_all(&format!("{}/{collection}", account_id.as_act()), &params)
            .await
    }

    /// Fetches every page of a collection endpoint.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AdpullResult<Vec<T>> {
        let mut url = self
            .base_url
            .join(&format!("{}/{path}", self.api_version))
            .map_err(|e| AdpullError::configuration(format!("invalid API path: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("access_token", &self.access_token);
            query.append_pair("limit", &PAGE_LIMIT.to_string());
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        let mut records = Vec::new();
        let mut next = Some(url.to_string());
        while let Some(page_url) = next {
            let page: Paged<T> = self.get_page(&page_url).await?;
            records.extend(page.data);
            next = page.paging.and_then(|p| p.next);
        }
        Ok(records)
    }

    async fn get_page<T: DeserializeOwned>(&self, url: &str) -> AdpullResult<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AdpullError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AdpullError::transport(format!("HTTP {status}")));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| AdpullError::transport(e.to_string()))?;
            return Err(classify_api_error(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AdpullError::transport(format!("invalid response body: {e}")))
    }
}

/// Maps a non-success Graph API response to the error taxonomy.
///
/// Only the documented rate-limit code is retryable with a pool pause;
/// every other application error aborts the run.
fn classify_api_error(status: u16, body: &str) -> AdpullError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if envelope.error.code == RATE_LIMIT_CODE => {
            AdpullError::rate_limited(envelope.error.message)
        }
        Ok(envelope) => AdpullError::Api {
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => AdpullError::Api {
            code: i64::from(status),
            message: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GraphClient {
        GraphClient::new(&GraphClientConfig {
            base_url: server.uri(),
            api_version: "v19.0".to_string(),
            access_token: "token".to_string(),
            timeout: Duration::from_secs(5),
        })
        .expect("client builds")
    }

    #[tokio::test]
    async fn test_ad_accounts_parses_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v19.0/me/adaccounts"))
            .and(query_param("access_token", "token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "account_id": "123",
                    "name": "Main",
                    "created_time": "2015-03-02T11:00:00+0100",
                    "timezone_offset_hours_utc": 1.0
                }]
            })))
            .mount(&server)
            .await;

        let accounts = client_for(&server)
            .ad_accounts("me")
            .await
            .expect("accounts fetch succeeds");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_id, "123");
        assert_eq!(accounts[0].created_date(), Some("2015-03-02".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_pagination_follows_next_links() {
        let server = MockServer::start().await;
        let next = format!("{}/v19.0/act_1/insights?after=page2", server.uri());
        Mock::given(method("GET"))
            .and(path("/v19.0/act_1/insights"))
            .and(query_param("access_token", "token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "date_start": "2024-01-05", "ad_id": "1", "impressions": "10",
                    "spend": "1.0", "impression_device": "iphone"
                }],
                "paging": { "next": next }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v19.0/act_1/insights"))
            .and(query_param("after", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "date_start": "2024-01-05", "ad_id": "2", "impressions": "20",
                    "spend": "2.0", "impression_device": "desktop"
                }]
            })))
            .mount(&server)
            .await;

        let rows = client_for(&server)
            .insights(&AccountId::new("1"), "2024-01-05".parse().unwrap())
            .await
            .expect("insights fetch succeeds");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].ad_id, "2");
    }

    #[tokio::test]
    async fn test_rate_limit_code_is_classified_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 17,
                    "message": "User request limit reached",
                    "type": "OAuthException"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .insights(&AccountId::new("1"), "2024-01-05".parse().unwrap())
            .await
            .expect_err("rate-limited request fails");
        assert!(err.is_rate_limit());
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_other_api_errors_are_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 100, "message": "Unsupported get request" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .insights(&AccountId::new("1"), "2024-01-05".parse().unwrap())
            .await
            .expect_err("bad request fails");
        assert!(!err.is_retryable());
        assert!(matches!(err, AdpullError::Api { code: 100, .. }));
    }

    #[tokio::test]
    async fn test_server_errors_are_retryable_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .ad_accounts("me")
            .await
            .expect_err("server error fails");
        assert!(err.is_retryable());
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn test_unparseable_error_body_keeps_status() {
        let err = classify_api_error(403, "gateway says no");
        match err {
            AdpullError::Api { code, message } => {
                assert_eq!(code, 403);
                assert!(message.contains("gateway"));
            }
            other => panic!("expected Api error, got {other}"),
        }
    }
}
