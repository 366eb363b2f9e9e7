//! HTTP solver client

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{
    client::{
        BuildRequest, BuildResponse, ReorderRequest, ReorderResponse, SolutionsRequest,
        SolutionsResponse, SolverClient,
    },
    SolverError,
};
use crate::config::SolverConfig;

/// JSON-over-HTTP client for the solver service
pub struct HttpSolverClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSolverClient {
    /// Create a new HTTP client
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SolverError::Config("solver base URL is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SolverError::Config(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, SolverError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Posting solver request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SolverError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| SolverError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SolverClient for HttpSolverClient {
    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse, SolverError> {
        self.post("/automaton/dot", request).await
    }

    async fn reorder(&self, request: &ReorderRequest) -> Result<ReorderResponse, SolverError> {
        self.post("/automaton/reorder", request).await
    }

    async fn solutions(
        &self,
        request: &SolutionsRequest,
    ) -> Result<SolutionsResponse, SolverError> {
        self.post("/automaton/solutions", request).await
    }
}
