mod client;

pub use client::*;

use crate::error::Result;
use crate::notifications::CompletedExchange;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    pub name: String,
    pub num_partitions: i32,
    pub replication_factor: i16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfigRequest {
    pub configs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncreasePartitionsRequest {
    pub total_partitions: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProduceMessageRequest {
    pub key: String,
    pub value: String,
}

/// A response from the cluster API, whatever its status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub exchange: CompletedExchange,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.exchange.is_success()
    }

    pub fn status(&self) -> u16 {
        self.exchange.status
    }
}

/// The cluster API's topic endpoints. One attempt per call, no retry.
///
/// `Err` means the exchange itself failed (connect, timeout); a non-2xx
/// answer is still `Ok` with its status and body.
#[async_trait]
pub trait TopicApi: Send + Sync {
    async fn list_topics(&self, cluster: &str) -> Result<ApiResponse>;
    async fn create_topic(&self, cluster: &str, request: &CreateTopicRequest) -> Result<ApiResponse>;
    async fn update_topic_config(
        &self,
        cluster: &str,
        topic: &str,
        request: &UpdateConfigRequest,
    ) -> Result<ApiResponse>;
    async fn increase_partitions(
        &self,
        cluster: &str,
        topic: &str,
        request: &IncreasePartitionsRequest,
    ) -> Result<ApiResponse>;
    async fn delete_topic(&self, cluster: &str, topic: &str) -> Result<ApiResponse>;
    async fn produce_message(
        &self,
        cluster: &str,
        topic: &str,
        request: &ProduceMessageRequest,
    ) -> Result<ApiResponse>;
}
