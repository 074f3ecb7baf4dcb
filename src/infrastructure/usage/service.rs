//! Usage metering service
//!
//! Logging a call never blocks or fails the call being logged: the
//! write happens on a detached task and a failed write is dropped with
//! a warning.

use std::sync::Arc;

use tracing::warn;

use crate::domain::api_key::ApiKeyId;
use crate::domain::usage::{UsageRange, UsageRecord, UsageRepository, UsageStats};
use crate::domain::DomainError;

/// Parameters for logging one metered call
#[derive(Debug, Clone)]
pub struct LogUsageParams {
    pub api_key_id: ApiKeyId,
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    pub tokens_consumed: Option<u64>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl LogUsageParams {
    pub fn new(
        api_key_id: ApiKeyId,
        endpoint: impl Into<String>,
        method: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self {
            api_key_id,
            endpoint: endpoint.into(),
            method: method.into(),
            status_code,
            tokens_consumed: None,
            ip_address: None,
            user_agent: None,
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

    fn into_record(self) -> UsageRecord {
        let mut record = UsageRecord::new(
            self.api_key_id,
            self.endpoint,
            self.method,
            self.status_code,
        );
        if let Some(tokens) = self.tokens_consumed {
            record = record.with_tokens_consumed(tokens);
        }
        if let Some(ip) = self.ip_address {
            record = record.with_ip_address(ip);
        }
        if let Some(user_agent) = self.user_agent {
            record = record.with_user_agent(user_agent);
        }
        record
    }
}

/// Usage metering service
#[derive(Debug)]
pub struct UsageMeter<R>
where
    R: UsageRepository,
{
    repository: Arc<R>,
}

impl<R: UsageRepository + 'static> UsageMeter<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Log one metered call.
    ///
    /// Fire-and-forget: the caller is never blocked on the write and a
    /// failed write drops the record with a warning. The returned
    /// handle lets tests await completion; callers may drop it.
    pub fn log_usage(&self, params: LogUsageParams) -> tokio::task::JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let record = params.into_record();

        tokio::spawn(async move {
            let id = record.id().clone();
            if let Err(error) = repository.insert(record).await {
                warn!(record_id = %id, %error, "usage logging failed, dropping record");
            }
        })
    }

    /// Aggregate statistics for one key over a time range
    pub async fn usage_stats(
        &self,
        api_key_id: &ApiKeyId,
        range: UsageRange,
    ) -> Result<UsageStats, DomainError> {
        self.repository.aggregate(api_key_id, &range).await
    }
}
