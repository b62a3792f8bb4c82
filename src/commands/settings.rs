use crate::error::ConsoleError;
use crate::state::{ConsoleState, Settings};

pub async fn get_settings(state: &ConsoleState) -> Result<Settings, ConsoleError> {
    Ok(state.settings.read().clone())
}

pub async fn update_settings(
    state: &ConsoleState,
    new_settings: Settings,
) -> Result<(), ConsoleError> {
    tracing::info!("update_settings called");

    // Container id belongs to the surface, which is fixed for the session
    let mut new_settings = new_settings;
    new_settings.container_id = state.settings.read().container_id.clone();

    state.apply_settings(new_settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_update_keeps_container_id() {
        let temp_dir = tempdir().unwrap();
        let (state, _) = ConsoleState::headless(temp_dir.path()).unwrap();

        let mut changed = get_settings(&state).await.unwrap();
        changed.container_id = "elsewhere".to_string();
        changed.auto_dismiss_ms = 1_500;
        update_settings(&state, changed).await.unwrap();

        let current = get_settings(&state).await.unwrap();
        assert_eq!(current.container_id, "notification-container");
        assert_eq!(current.auto_dismiss_ms, 1_500);
        assert!(temp_dir.path().join("settings.json").exists());
    }
}
