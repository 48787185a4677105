//! Itemized job log and the final job report

use crate::models::JobStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Log entry severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational, e.g. a skipped non-media file
    Info,
    /// Something was left unchanged
    Warning,
    /// Soft job error; the job completes with errors
    Error,
}

/// One entry of the job's itemized log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMessage {
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// File the message refers to, when there is one
    pub file_path: Option<String>,

    pub occurred_at: DateTime<Utc>,
}

impl JobMessage {
    pub fn new(severity: Severity, message: impl Into<String>, file_path: Option<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            file_path,
            occurred_at: Utc::now(),
        }
    }
}

/// Externally visible outcome of one import job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: Uuid,

    /// Terminal status (`Completed` or `CompletedWithErrors`)
    pub status: JobStatus,

    /// Itemized log
    pub messages: Vec<JobMessage>,

    /// Job comment including the download link
    pub comment: String,

    /// Public URL of the stored rewritten spreadsheet
    pub spreadsheet_url: Option<String>,

    /// Rows whose resource and media were recorded
    pub rows_linked: usize,

    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl JobReport {
    /// Count messages by severity
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.messages.iter().filter(|m| m.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.status == JobStatus::CompletedWithErrors
    }
}
