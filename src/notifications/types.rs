//! Notification value types shared by the decoder, renderer and pending store.

use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};

/// Visual severity of a toast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Success,
    Error,
}

impl std::str::FromStr for Severity {
    type Err = ConsoleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "success" => Ok(Self::Success),
            _ => Err(ConsoleError::Other(format!("Unknown severity: {}", s))),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl Severity {
    /// Lenient parse used for header and storage values: missing or unknown
    /// values fall back to success.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse::<Severity>().ok())
            .unwrap_or_default()
    }
}

/// A message and its severity. The message is never empty.
///
/// Serializes as `{"message": ..., "type": ...}`, which is also the
/// representation kept in the pending-notification slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NotificationRecord")]
pub struct Notification {
    message: String,
    #[serde(rename = "type")]
    severity: Severity,
}

/// Loosely-typed stored form; `type` may be missing or unrecognized.
#[derive(Deserialize)]
struct NotificationRecord {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl TryFrom<NotificationRecord> for Notification {
    type Error = ConsoleError;

    fn try_from(record: NotificationRecord) -> Result<Self> {
        let severity = Severity::parse_lenient(record.kind.as_deref());
        Notification::new(record.message.unwrap_or_default(), severity)
    }
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Result<Self> {
        let message = message.into();
        if message.is_empty() {
            return Err(ConsoleError::EmptyNotification);
        }
        Ok(Self { message, severity })
    }

    pub fn success(message: impl Into<String>) -> Result<Self> {
        Self::new(message, Severity::Success)
    }

    pub fn error(message: impl Into<String>) -> Result<Self> {
        Self::new(message, Severity::Error)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parsing() {
        assert_eq!("error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("ERROR".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("success".parse::<Severity>().unwrap(), Severity::Success);
        assert!(matches!("warning".parse::<Severity>(), Err(ConsoleError::Other(_))));
        assert_eq!(Severity::parse_lenient(Some("warning")), Severity::Success);
        assert_eq!(Severity::parse_lenient(Some(" Error ")), Severity::Error);
        assert_eq!(Severity::parse_lenient(None), Severity::Success);
    }

    #[test]
    fn test_empty_message_rejected() {
        assert!(matches!(
            Notification::success(""),
            Err(ConsoleError::EmptyNotification)
        ));
    }

    #[test]
    fn test_wire_shape() {
        let n = Notification::error("Falha ao listar tópicos").unwrap();
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["message"], "Falha ao listar tópicos");
        assert_eq!(json["type"], "error");
    }

    #[test]
    fn test_lenient_deserialize() {
        let n: Notification = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert_eq!(n.severity(), Severity::Success);

        let n: Notification =
            serde_json::from_str(r#"{"message":"ok","type":"warning"}"#).unwrap();
        assert_eq!(n.severity(), Severity::Success);

        assert!(serde_json::from_str::<Notification>(r#"{"message":"","type":"error"}"#).is_err());
        assert!(serde_json::from_str::<Notification>("null").is_err());
    }
}
