//! HTTP oracle client (reqwest).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tollgate_core::{
    ModuleAccess, OracleError, PermissionOracle, StatusOracle, StatusReport, SubscriptionOracle,
};

use crate::envelope::{AccessData, StatusData, SubscriptionData, parse_envelope};

/// Endpoint paths of the oracle backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleEndpoints {
    pub status: String,
    pub subscription: String,
    pub access: String,
}

impl Default for OracleEndpoints {
    fn default() -> Self {
        Self {
            status: "/api/account/status".to_string(),
            subscription: "/api/subscription/status".to_string(),
            access: "/api/account/access".to_string(),
        }
    }
}

/// Client for the status, subscription and permission oracles.
///
/// One `GET` per call with `Authorization: Bearer <token>`. No retries: the
/// edge is one-shot and the client tier's poll is the only retry mechanism.
#[derive(Debug, Clone)]
pub struct HttpOracleClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: OracleEndpoints,
}

impl HttpOracleClient {
    pub fn new(
        base_url: impl Into<String>,
        endpoints: OracleEndpoints,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Unreachable(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoints,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, OracleError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| OracleError::Unreachable(e.to_string()))?;

        let status = resp.status();
        debug!(%url, status = status.as_u16(), "oracle responded");
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(OracleError::NotFound);
        }
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| OracleError::Unreachable(e.to_string()))?;
        parse_envelope(&body)
    }
}

#[async_trait::async_trait]
impl StatusOracle for HttpOracleClient {
    async fn account_status(&self, token: &str) -> Result<StatusReport, OracleError> {
        let data: StatusData = self.get_data(&self.endpoints.status, token).await?;
        data.into_report()
    }
}

#[async_trait::async_trait]
impl SubscriptionOracle for HttpOracleClient {
    async fn has_subscription(&self, token: &str) -> Result<bool, OracleError> {
        let data: SubscriptionData = self.get_data(&self.endpoints.subscription, token).await?;
        Ok(data.has_subscription)
    }
}

#[async_trait::async_trait]
impl PermissionOracle for HttpOracleClient {
    async fn module_access(&self, token: &str) -> Result<ModuleAccess, OracleError> {
        let data: AccessData = self.get_data(&self.endpoints.access, token).await?;
        Ok(data.into())
    }
}
