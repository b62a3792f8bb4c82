//! Topic actions triggered from the console and how their outcome is told to
//! the user.

use crate::api::{
    ApiResponse, CreateTopicRequest, IncreasePartitionsRequest, ProduceMessageRequest, TopicApi,
    UpdateConfigRequest,
};
use crate::error::Result;
use crate::notifications::{DeliveryCoordinator, FailedExchange, Notification};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub const CONFIG_UNCHANGED: &str = "Nenhuma configuração foi modificada";
pub const CONFIG_UPDATED: &str = "Configurações atualizadas com sucesso!";
pub const PARTITIONS_INCREASED: &str = "Partições aumentadas com sucesso!";
pub const TOPIC_DELETED: &str = "Tópico deletado com sucesso!";
pub const MESSAGE_PRODUCED: &str = "Mensagem enviada com sucesso!";

/// What the host page should do once an action has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Stay,
    Reload,
    Navigate(String),
}

/// UI path of a cluster's topic list
pub fn topics_page(cluster: &str) -> String {
    format!("/cluster/{}/topics", cluster)
}

pub struct TopicActions<A: TopicApi> {
    api: A,
    coordinator: Arc<DeliveryCoordinator>,
}

impl<A: TopicApi> TopicActions<A> {
    pub fn new(api: A, coordinator: Arc<DeliveryCoordinator>) -> Self {
        Self { api, coordinator }
    }

    pub fn coordinator(&self) -> &Arc<DeliveryCoordinator> {
        &self.coordinator
    }

    /// Fetch the topic list fragment; its headers may carry a notification.
    pub async fn refresh_topics(&self, cluster: &str) -> Option<String> {
        let response = self.api.list_topics(cluster).await;
        self.complete_fragment(&format!("list topics of '{}'", cluster), response)
    }

    /// Create a topic. The server answers with notification headers and a
    /// `topic-created` trigger; both go through the coordinator.
    pub async fn create_topic(&self, cluster: &str, request: CreateTopicRequest) -> ActionOutcome {
        tracing::info!("Creating topic '{}' on cluster '{}'", request.name, cluster);
        let response = self.api.create_topic(cluster, &request).await;
        self.complete_fragment(&format!("create topic '{}'", request.name), response);
        ActionOutcome::Stay
    }

    /// Blank values are treated as untouched fields and are not sent.
    pub async fn update_topic_config(
        &self,
        cluster: &str,
        topic: &str,
        configs: HashMap<String, String>,
    ) -> ActionOutcome {
        let configs: BTreeMap<String, String> = configs
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();

        if configs.is_empty() {
            self.show(Notification::error(CONFIG_UNCHANGED));
            return ActionOutcome::Stay;
        }

        tracing::info!("Updating {} config(s) of topic '{}'", configs.len(), topic);
        let response = self
            .api
            .update_topic_config(cluster, topic, &UpdateConfigRequest { configs })
            .await;

        match self.check(topic, response) {
            Some(_) => {
                self.queue(Notification::success(CONFIG_UPDATED));
                ActionOutcome::Reload
            }
            None => ActionOutcome::Stay,
        }
    }

    pub async fn increase_partitions(&self, cluster: &str, topic: &str, total_partitions: i32) -> ActionOutcome {
        tracing::info!("Increasing partitions of '{}' to {}", topic, total_partitions);
        let response = self
            .api
            .increase_partitions(cluster, topic, &IncreasePartitionsRequest { total_partitions })
            .await;

        match self.check(topic, response) {
            Some(_) => {
                self.queue(Notification::success(PARTITIONS_INCREASED));
                ActionOutcome::Reload
            }
            None => ActionOutcome::Stay,
        }
    }

    /// On success the notification is parked and the host navigates to the
    /// topic list, whose page load shows it.
    pub async fn delete_topic(&self, cluster: &str, topic: &str) -> ActionOutcome {
        tracing::info!("Deleting topic '{}' on cluster '{}'", topic, cluster);
        let response = self.api.delete_topic(cluster, topic).await;

        match self.check(topic, response) {
            Some(_) => {
                self.queue(Notification::success(TOPIC_DELETED));
                ActionOutcome::Navigate(topics_page(cluster))
            }
            None => ActionOutcome::Stay,
        }
    }

    pub async fn produce_message(&self, cluster: &str, topic: &str, key: &str, value: &str) -> ActionOutcome {
        let request = ProduceMessageRequest {
            key: key.to_string(),
            value: value.to_string(),
        };
        let response = self.api.produce_message(cluster, topic, &request).await;

        if self.check(topic, response).is_some() {
            self.show(Notification::success(MESSAGE_PRODUCED));
        }
        ActionOutcome::Stay
    }

    /// Success responses pass through; failures become an error toast.
    fn check(&self, subject: &str, response: Result<ApiResponse>) -> Option<ApiResponse> {
        match response {
            Ok(response) if response.is_success() => Some(response),
            Ok(response) => {
                let detail = Some(format!("Erro: {}", response.body.trim()))
                    .filter(|_| !response.body.trim().is_empty());
                self.coordinator
                    .on_exchange_failed(&FailedExchange::new(response.exchange.source.clone(), detail));
                None
            }
            Err(e) => {
                tracing::warn!("Request for '{}' failed: {}", subject, e);
                self.coordinator
                    .on_exchange_failed(&FailedExchange::new(subject, Some(format!("Erro: {}", e))));
                None
            }
        }
    }

    /// htmx-style completion: headers always go to the coordinator, a failed
    /// status additionally raises the body as an error.
    fn complete_fragment(&self, what: &str, response: Result<ApiResponse>) -> Option<String> {
        match response {
            Ok(response) => {
                self.coordinator.on_exchange_completed(&response.exchange);
                if response.is_success() {
                    Some(response.body)
                } else {
                    let detail = Some(response.body.trim().to_string()).filter(|b| !b.is_empty());
                    self.coordinator
                        .on_exchange_failed(&FailedExchange::new(response.exchange.source, detail));
                    None
                }
            }
            Err(e) => {
                tracing::warn!("Failed to {}: {}", what, e);
                self.coordinator
                    .on_exchange_failed(&FailedExchange::new(what, Some(e.to_string())));
                None
            }
        }
    }

    fn show(&self, notification: Result<Notification>) {
        if let Ok(notification) = notification {
            self.coordinator.notify(&notification);
        }
    }

    fn queue(&self, notification: Result<Notification>) {
        if let Ok(notification) = notification {
            self.coordinator.notify_after_navigation(&notification);
        }
    }
}
