//! REST client for a vtctld-style HTTP endpoint.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use vtconsole_core::keyspace::Keyspace;
use vtconsole_core::workflow::WorkflowNode;

use super::{BackendError, KeyspaceService, LogSink, VtctlBackend};

/// HTTP client for a single vtctld instance.
pub struct VtctldClient {
    client: reqwest::Client,
    api_url: String,
}

/// Body returned by `POST /api/vtctl/`.
#[derive(Debug, Deserialize)]
struct VtctlResponse {
    #[serde(rename = "Error", default)]
    error: String,
    #[serde(rename = "Output", default)]
    output: String,
}

#[derive(Debug, Default, Deserialize)]
struct SrvKeyspace {
    #[serde(default)]
    partitions: Vec<Partition>,
}

#[derive(Debug, Deserialize)]
struct Partition {
    #[serde(default)]
    shard_references: Vec<ShardReference>,
}

#[derive(Debug, Deserialize)]
struct ShardReference {
    name: String,
}

impl VtctldClient {
    /// * `api_url` - Base HTTP URL, e.g. `http://host:15000`.
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self
            .client
            .get(format!("{}{path}", self.api_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Serving shards come from the local serving graph; everything else
    /// the topology knows about is non-serving.
    async fn fetch_keyspace(&self, name: &str) -> Result<Keyspace, BackendError> {
        let all: Vec<String> = self.get_json(&format!("/api/shards/{name}/")).await?;
        let srv: SrvKeyspace = self
            .get_json::<Option<SrvKeyspace>>(&format!("/api/srv_keyspace/local/{name}"))
            .await?
            .unwrap_or_default();

        let serving: BTreeSet<String> = srv
            .partitions
            .into_iter()
            .flat_map(|p| p.shard_references)
            .map(|r| r.name)
            .collect();
        let nonserving = all.into_iter().filter(|s| !serving.contains(s)).collect();

        Ok(Keyspace {
            name: name.to_string(),
            serving_shards: Some(serving.into_iter().collect()),
            nonserving_shards: Some(nonserving),
        })
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl KeyspaceService for VtctldClient {
    async fn get_keyspaces(&self) -> Result<Vec<Keyspace>, BackendError> {
        let names: Vec<String> = self.get_json("/api/keyspaces/").await?;
        try_join_all(names.iter().map(|name| self.fetch_keyspace(name))).await
    }

    async fn get_keyspace(&self, name: &str) -> Result<Keyspace, BackendError> {
        self.fetch_keyspace(name).await
    }
}

#[async_trait]
impl VtctlBackend for VtctldClient {
    /// vtctld answers with the whole output at once, so the sink receives a
    /// single chunk.
    async fn run_command(&self, args: &[String], log: LogSink) -> Result<(), BackendError> {
        let response = self
            .client
            .post(format!("{}/api/vtctl/", self.api_url))
            .json(args)
            .send()
            .await?;
        let result: VtctlResponse = Self::parse_response(response).await?;

        if !result.output.is_empty() {
            // The receiver is gone only if the dialog was torn down.
            let _ = log.send(result.output);
        }
        if result.error.is_empty() {
            Ok(())
        } else {
            Err(BackendError::Command(result.error))
        }
    }

    async fn workflow_tree(&self) -> Result<WorkflowNode, BackendError> {
        self.get_json("/api/workflow/tree").await
    }

    async fn workflow_action(&self, path: &str, name: &str) -> Result<(), BackendError> {
        let body = serde_json::json!({
            "path": path,
            "name": name,
        });
        let response = self
            .client
            .post(format!("{}/api/workflow/action", self.api_url))
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
