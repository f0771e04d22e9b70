use std::fmt;

/// Failure talking to the analysis pipeline. `detail` is short enough to show
/// to the user as-is.
#[derive(Debug, Clone)]
pub struct TransportError {
    pub stage: &'static str,
    pub detail: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn status(status: u16) -> Self {
        Self {
            stage: "http_status",
            detail: format!("Server returned {status}"),
            status: Some(status),
        }
    }

    pub fn connect(detail: impl Into<String>) -> Self {
        Self {
            stage: "connect",
            detail: detail.into(),
            status: None,
        }
    }

    pub fn read(detail: impl Into<String>) -> Self {
        Self {
            stage: "read",
            detail: detail.into(),
            status: None,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "analysis stream error (stage={}): {}",
            self.stage, self.detail
        )
    }
}

impl std::error::Error for TransportError {}

/// The message a failed run shows. Errors that did not come from the
/// transport are reported generically.
pub fn user_facing_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TransportError>() {
        Some(transport) => transport.detail.clone(),
        None => "Connection failed".to_string(),
    }
}
