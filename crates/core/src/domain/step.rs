use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Step,
    Status,
}

/// One entry of the run's progress log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingStep {
    pub id: String,
    pub node: String,
    pub label: String,
    pub message: String,
    pub status: StepStatus,
    pub kind: StepKind,
    pub timestamp: DateTime<Utc>,
}

impl ThinkingStep {
    pub fn completed(
        id: impl Into<String>,
        node: impl Into<String>,
        label: impl Into<String>,
        message: impl Into<String>,
        kind: StepKind,
    ) -> Self {
        Self {
            id: id.into(),
            node: node.into(),
            label: label.into(),
            message: message.into(),
            status: StepStatus::Completed,
            kind,
            timestamp: Utc::now(),
        }
    }
}
