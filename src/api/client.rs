use super::{
    ApiResponse, CreateTopicRequest, IncreasePartitionsRequest, ProduceMessageRequest, TopicApi,
    UpdateConfigRequest,
};
use crate::error::{ConsoleError, Result};
use crate::notifications::CompletedExchange;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use std::time::Duration;

/// Plural resource prefix used by the cluster API
pub const DEFAULT_API_PREFIX: &str = "/api/clusters";
/// Default request timeout (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ClusterApiClient {
    client: Client,
    base_url: Url,
    /// Path segments of the resource prefix, e.g. `["api", "clusters"]`
    prefix: Vec<String>,
}

impl ClusterApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, DEFAULT_API_PREFIX, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_options(base_url: &str, prefix: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConsoleError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConsoleError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            client,
            base_url,
            prefix: prefix
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    /// `{base}{prefix}/{cluster}/topics[/...]`, each segment percent-encoded.
    pub fn topics_url(&self, cluster: &str, rest: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(self.prefix.iter().map(String::as_str));
            segments.push(cluster);
            segments.push("topics");
            segments.extend(rest.iter().copied());
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse> {
        let response = request.send().await?;

        let exchange = CompletedExchange::new(
            response.url().to_string(),
            response.status().as_u16(),
            response.headers().clone(),
        );
        let body = response.text().await.unwrap_or_default();

        if !exchange.is_success() {
            tracing::warn!("{} answered {}: {}", exchange.source, exchange.status, body);
        }

        Ok(ApiResponse { exchange, body })
    }
}

#[async_trait]
impl TopicApi for ClusterApiClient {
    async fn list_topics(&self, cluster: &str) -> Result<ApiResponse> {
        let url = self.topics_url(cluster, &[]);
        self.send(self.request(Method::GET, url)).await
    }

    async fn create_topic(&self, cluster: &str, request: &CreateTopicRequest) -> Result<ApiResponse> {
        let url = self.topics_url(cluster, &[]);
        self.send(self.request(Method::POST, url).json(request)).await
    }

    async fn update_topic_config(
        &self,
        cluster: &str,
        topic: &str,
        request: &UpdateConfigRequest,
    ) -> Result<ApiResponse> {
        let url = self.topics_url(cluster, &[topic, "config"]);
        self.send(self.request(Method::PUT, url).json(request)).await
    }

    async fn increase_partitions(
        &self,
        cluster: &str,
        topic: &str,
        request: &IncreasePartitionsRequest,
    ) -> Result<ApiResponse> {
        let url = self.topics_url(cluster, &[topic, "partitions"]);
        self.send(self.request(Method::POST, url).json(request)).await
    }

    async fn delete_topic(&self, cluster: &str, topic: &str) -> Result<ApiResponse> {
        let url = self.topics_url(cluster, &[topic]);
        self.send(self.request(Method::DELETE, url)).await
    }

    async fn produce_message(
        &self,
        cluster: &str,
        topic: &str,
        request: &ProduceMessageRequest,
    ) -> Result<ApiResponse> {
        let url = self.topics_url(cluster, &[topic, "messages"]);
        self.send(self.request(Method::POST, url).json(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_urls() {
        let client = ClusterApiClient::new("http://localhost:8080").unwrap();
        assert_eq!(
            client.topics_url("local", &[]).as_str(),
            "http://localhost:8080/api/clusters/local/topics"
        );
        assert_eq!(
            client.topics_url("local", &["orders", "config"]).as_str(),
            "http://localhost:8080/api/clusters/local/topics/orders/config"
        );
    }

    #[test]
    fn test_segments_are_encoded() {
        let client = ClusterApiClient::new("http://localhost:8080/console/").unwrap();
        assert_eq!(
            client.topics_url("prod east", &["a/b"]).as_str(),
            "http://localhost:8080/console/api/clusters/prod%20east/topics/a%2Fb"
        );
    }

    #[test]
    fn test_singular_prefix() {
        let client =
            ClusterApiClient::with_options("http://localhost:8080", "/api/cluster", DEFAULT_REQUEST_TIMEOUT)
                .unwrap();
        assert_eq!(
            client.topics_url("local", &["orders"]).as_str(),
            "http://localhost:8080/api/cluster/local/topics/orders"
        );
    }

    #[test]
    fn test_rejects_bad_base() {
        assert!(matches!(
            ClusterApiClient::new("not a url"),
            Err(ConsoleError::InvalidUrl(_))
        ));
        assert!(matches!(
            ClusterApiClient::new("mailto:ops@example.com"),
            Err(ConsoleError::InvalidUrl(_))
        ));
    }
}
