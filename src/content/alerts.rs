//! Alerts shown to admin users.
//!
//! Request-scoped alerts ride along in responses. App alerts are stored as a JSON array
//! in the `piton/appAlert` data-store row so background work can leave a notice for the
//! next admin request, which reads and clears them.

use serde::{Deserialize, Serialize};

use crate::content::definitions::DefinitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Primary,
    Secondary,
    Success,
    Danger,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub heading: String,
    #[serde(default)]
    pub message: Vec<String>,
}

impl Alert {
    pub fn new(severity: Severity, heading: impl Into<String>) -> Self {
        Self {
            severity,
            heading: heading.into(),
            message: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message.push(message.into());
        self
    }
}

impl From<&DefinitionError> for Alert {
    fn from(err: &DefinitionError) -> Self {
        Self {
            severity: Severity::Danger,
            heading: format!("Definition '{}' could not be loaded", err.template),
            message: err.messages.clone(),
        }
    }
}

/// Stored app alerts; a missing or unreadable value means none.
pub fn decode_alerts(stored: Option<&str>) -> Vec<Alert> {
    let Some(stored) = stored.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str(stored) {
        Ok(alerts) => alerts,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable app alerts");
            Vec::new()
        }
    }
}

/// New stored value with `alert` appended to what is already there.
pub fn append_alert(stored: Option<&str>, alert: Alert) -> Result<String, serde_json::Error> {
    let mut alerts = decode_alerts(stored);
    alerts.push(alert);
    serde_json::to_string(&alerts)
}
