//! Commands the host page calls on its lifecycle events.

use crate::error::ConsoleError;
use crate::notifications::{CompletedExchange, Delivery, FailedExchange, ToastId};
use crate::state::ConsoleState;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Shown,
    Suppressed,
    NotMounted,
    Quiet,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub outcome: DeliveryOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast_id: Option<ToastId>,
}

fn report(state: &ConsoleState, delivery: Delivery) -> DeliveryReport {
    match delivery {
        Delivery::Shown(handle) => {
            let toast_id = handle.id();
            state.track_toast(handle);
            DeliveryReport {
                outcome: DeliveryOutcome::Shown,
                toast_id: Some(toast_id),
            }
        }
        Delivery::Suppressed => DeliveryReport {
            outcome: DeliveryOutcome::Suppressed,
            toast_id: None,
        },
        Delivery::NotMounted => DeliveryReport {
            outcome: DeliveryOutcome::NotMounted,
            toast_id: None,
        },
        Delivery::Quiet => DeliveryReport {
            outcome: DeliveryOutcome::Quiet,
            toast_id: None,
        },
    }
}

/// Build a header map from raw pairs, skipping pairs that are not valid headers.
pub fn header_map(pairs: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => tracing::debug!("Skipping invalid header '{}'", name),
        }
    }
    headers
}

/// A new document finished loading: fresh coordinator, then drain the pending slot.
pub async fn page_loaded(state: &ConsoleState) -> Result<DeliveryReport, ConsoleError> {
    let coordinator = state.begin_page();
    Ok(report(state, coordinator.on_page_load()))
}

pub async fn fragment_swapped(
    state: &ConsoleState,
    container: String,
) -> Result<DeliveryReport, ConsoleError> {
    let delivery = state.coordinator().on_fragment_swapped(&container);
    Ok(report(state, delivery))
}

pub async fn exchange_completed(
    state: &ConsoleState,
    source: String,
    status: u16,
    headers: Vec<(String, String)>,
) -> Result<DeliveryReport, ConsoleError> {
    let exchange = CompletedExchange::new(source, status, header_map(&headers));
    let delivery = state.coordinator().on_exchange_completed(&exchange);
    Ok(report(state, delivery))
}

pub async fn exchange_failed(
    state: &ConsoleState,
    source: String,
    detail: Option<String>,
) -> Result<DeliveryReport, ConsoleError> {
    let delivery = state
        .coordinator()
        .on_exchange_failed(&FailedExchange::new(source, detail));
    Ok(report(state, delivery))
}

/// The user clicked a toast's close control.
pub async fn dismiss_toast(state: &ConsoleState, toast_id: ToastId) -> Result<bool, ConsoleError> {
    match state.toast(toast_id) {
        Some(handle) => Ok(handle.dismiss()),
        None => {
            tracing::debug!("No live toast with id {}", toast_id);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::{ToastPhase, NOTIFICATION_HEADER, NOTIFICATION_TYPE_HEADER};
    use tempfile::tempdir;

    fn notification_headers(message: &str) -> Vec<(String, String)> {
        vec![
            (NOTIFICATION_HEADER.to_string(), message.to_string()),
            (NOTIFICATION_TYPE_HEADER.to_string(), "success".to_string()),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_exchange_then_dismiss() {
        let temp_dir = tempdir().unwrap();
        let (state, surface) = ConsoleState::headless(temp_dir.path()).unwrap();
        page_loaded(&state).await.unwrap();

        let shown = exchange_completed(
            &state,
            "/api/clusters/local/topics".to_string(),
            200,
            notification_headers("Topic created"),
        )
        .await
        .unwrap();
        assert_eq!(shown.outcome, DeliveryOutcome::Shown);
        let toast_id = shown.toast_id.unwrap();

        let repeat = exchange_completed(
            &state,
            "/api/clusters/local/topics".to_string(),
            200,
            notification_headers("Topic created"),
        )
        .await
        .unwrap();
        assert_eq!(repeat.outcome, DeliveryOutcome::Suppressed);

        assert!(dismiss_toast(&state, toast_id).await.unwrap());
        assert_eq!(surface.phase_of(toast_id), Some(ToastPhase::Exiting));
        assert!(!dismiss_toast(&state, toast_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_page_load_resets_dedup() {
        let temp_dir = tempdir().unwrap();
        let (state, _) = ConsoleState::headless(temp_dir.path()).unwrap();

        for _ in 0..2 {
            page_loaded(&state).await.unwrap();
            let report = exchange_completed(
                &state,
                "/topics".to_string(),
                200,
                notification_headers("Same"),
            )
            .await
            .unwrap();
            assert_eq!(report.outcome, DeliveryOutcome::Shown);
        }
    }

    #[tokio::test]
    async fn test_failure_uses_generic_message() {
        let temp_dir = tempdir().unwrap();
        let (state, surface) = ConsoleState::headless(temp_dir.path()).unwrap();

        let report = exchange_failed(&state, "/topics".to_string(), None).await.unwrap();
        assert_eq!(report.outcome, DeliveryOutcome::Shown);
        assert_eq!(surface.messages(), vec!["Erro na operação".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_container_reports_not_mounted() {
        let temp_dir = tempdir().unwrap();
        let (state, surface) = ConsoleState::headless(temp_dir.path()).unwrap();
        surface.set_container_present(false);

        let report = exchange_failed(&state, "/topics".to_string(), Some("boom".to_string()))
            .await
            .unwrap();
        assert_eq!(report.outcome, DeliveryOutcome::NotMounted);
        assert!(report.toast_id.is_none());
    }

    #[test]
    fn test_header_map_skips_invalid_pairs() {
        let headers = header_map(&[
            ("bad header".to_string(), "x".to_string()),
            (NOTIFICATION_HEADER.to_string(), "ok".to_string()),
        ]);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(NOTIFICATION_HEADER).unwrap(), "ok");
    }

    #[test]
    fn test_report_serialization() {
        let report = DeliveryReport {
            outcome: DeliveryOutcome::NotMounted,
            toast_id: None,
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"outcome":"not_mounted"}"#
        );
    }
}
