//! Usage record entities and aggregate statistics

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::api_key::ApiKeyId;

/// Unique identifier for a usage record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageRecordId(String);

impl UsageRecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique ID
    pub fn generate() -> Self {
        Self(format!("usage-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UsageRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single metered call. Append-only; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    id: UsageRecordId,
    /// Key that made the request (reference, not ownership)
    pub api_key_id: ApiKeyId,
    /// Endpoint path that was called
    pub endpoint: String,
    /// HTTP method
    pub method: String,
    /// Response status code
    pub status_code: u16,
    /// Tokens consumed by the call, when the operation meters them
    pub tokens_consumed: Option<u64>,
    /// Caller IP address
    pub ip_address: Option<String>,
    /// Caller user agent
    pub user_agent: Option<String>,
    /// When the call happened
    pub created_at: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(
        api_key_id: ApiKeyId,
        endpoint: impl Into<String>,
        method: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self {
            id: UsageRecordId::generate(),
            api_key_id,
            endpoint: endpoint.into(),
            method: method.into(),
            status_code,
            tokens_consumed: None,
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_tokens_consumed(mut self, tokens: u64) -> Self {
        self.tokens_consumed = Some(tokens);
        self
    }

    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn id(&self) -> &UsageRecordId {
        &self.id
    }

    /// 2xx responses count as successful
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// 4xx and 5xx responses count as failed
    pub fn is_failure(&self) -> bool {
        self.status_code >= 400
    }
}

/// Half-open time range for aggregation. Either bound may be absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl UsageRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        if let Some(from) = self.from {
            if timestamp < from {
                return false;
            }
        }

        if let Some(to) = self.to {
            if timestamp >= to {
                return false;
            }
        }

        true
    }
}

/// Per-endpoint request count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCount {
    pub endpoint: String,
    pub count: u64,
}

/// Aggregated usage statistics for one key over a range.
///
/// An empty matching range yields the all-zero default, never an error.
/// Redirects count toward `total_requests` only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_tokens_consumed: u64,
    /// Sorted by count descending, endpoint ascending on ties
    pub requests_by_endpoint: Vec<EndpointCount>,
}

impl UsageStats {
    /// Aggregate a set of records into statistics.
    pub fn collect<'a>(records: impl IntoIterator<Item = &'a UsageRecord>) -> Self {
        let mut stats = Self::default();
        let mut by_endpoint: HashMap<String, u64> = HashMap::new();

        for record in records {
            stats.total_requests += 1;

            if record.is_success() {
                stats.successful_requests += 1;
            } else if record.is_failure() {
                stats.failed_requests += 1;
            }

            stats.total_tokens_consumed += record.tokens_consumed.unwrap_or(0);
            *by_endpoint.entry(record.endpoint.clone()).or_insert(0) += 1;
        }

        let mut requests_by_endpoint: Vec<EndpointCount> = by_endpoint
            .into_iter()
            .map(|(endpoint, count)| EndpointCount { endpoint, count })
            .collect();
        requests_by_endpoint
            .sort_by(|a, b| b.count.cmp(&a.count).then(a.endpoint.cmp(&b.endpoint)));
        stats.requests_by_endpoint = requests_by_endpoint;

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(endpoint: &str, status: u16) -> UsageRecord {
        UsageRecord::new(ApiKeyId::from("key-1"), endpoint, "POST", status)
    }

    #[test]
    fn test_success_and_failure_buckets() {
        assert!(record("/v1/content", 200).is_success());
        assert!(record("/v1/content", 299).is_success());
        assert!(!record("/v1/content", 301).is_success());
        assert!(!record("/v1/content", 301).is_failure());
        assert!(record("/v1/content", 404).is_failure());
        assert!(record("/v1/content", 500).is_failure());
    }

    #[test]
    fn test_collect_empty_yields_zero_stats() {
        let stats = UsageStats::collect([]);
        assert_eq!(stats, UsageStats::default());
        assert_eq!(stats.total_requests, 0);
        assert!(stats.requests_by_endpoint.is_empty());
    }

    #[test]
    fn test_collect_counts_and_tokens() {
        let records = vec![
            record("/v1/content", 200).with_tokens_consumed(120),
            record("/v1/content", 200),
            record("/v1/jobs", 404).with_tokens_consumed(5),
            record("/v1/jobs", 302),
        ];

        let stats = UsageStats::collect(&records);
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.successful_requests, 2);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.total_tokens_consumed, 125);
    }

    #[test]
    fn test_endpoint_breakdown_sorted_by_count_desc() {
        let records = vec![
            record("/v1/jobs", 200),
            record("/v1/content", 200),
            record("/v1/content", 200),
            record("/v1/content", 500),
        ];

        let stats = UsageStats::collect(&records);
        assert_eq!(stats.requests_by_endpoint.len(), 2);
        assert_eq!(stats.requests_by_endpoint[0].endpoint, "/v1/content");
        assert_eq!(stats.requests_by_endpoint[0].count, 3);
        assert_eq!(stats.requests_by_endpoint[1].endpoint, "/v1/jobs");
        assert_eq!(stats.requests_by_endpoint[1].count, 1);
    }

    #[test]
    fn test_range_bounds() {
        let now = Utc::now();
        let range = UsageRange::new(Some(now - chrono::Duration::hours(1)), Some(now));

        assert!(range.contains(now - chrono::Duration::minutes(30)));
        assert!(!range.contains(now));
        assert!(!range.contains(now - chrono::Duration::hours(2)));
        assert!(UsageRange::unbounded().contains(now));
    }
}
