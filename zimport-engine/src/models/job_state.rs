//! Import job state machine
//!
//! Initialized → FileMapBuilt → BatchProcessing → Finalizing →
//! {Completed, CompletedWithErrors}

use crate::models::{FileMap, JobArgs, JobMessage, JobReport, MediaMap, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Import job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Arguments accepted, nothing scanned yet
    Initialized,
    /// Sibling media assigned to row identifiers
    FileMapBuilt,
    /// Row pipeline running
    BatchProcessing,
    /// Orphan detection, rewrite, cleanup
    Finalizing,
    /// Finished without any soft error
    Completed,
    /// Finished, at least one soft error was logged
    CompletedWithErrors,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::CompletedWithErrors)
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub job_id: Uuid,
    pub old_state: JobStatus,
    pub new_state: JobStatus,
    pub transitioned_at: DateTime<Utc>,
}

/// Everything one job execution owns
///
/// Created at job start and turned into a [`JobReport`] at job end. Never
/// shared between jobs.
#[derive(Debug)]
pub struct JobState {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub file_map: FileMap,
    pub media_map: MediaMap,
    pub has_error: bool,
    pub temp_path: PathBuf,
    pub csv_path: PathBuf,
    pub comment: String,
    pub spreadsheet_url: Option<String>,
    pub log: Vec<JobMessage>,
    pub transitions: Vec<StateTransition>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl JobState {
    pub fn new(args: &JobArgs) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            status: JobStatus::Initialized,
            file_map: FileMap::new(),
            media_map: MediaMap::new(),
            has_error: false,
            temp_path: args.temppath.clone(),
            csv_path: args.filepath().to_path_buf(),
            comment: args.comment.clone().unwrap_or_default(),
            spreadsheet_url: None,
            log: Vec::new(),
            transitions: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: JobStatus) -> &StateTransition {
        tracing::debug!(
            job_id = %self.job_id,
            from = ?self.status,
            to = ?new_state,
            "Job state transition"
        );

        self.transitions.push(StateTransition {
            job_id: self.job_id,
            old_state: self.status,
            new_state,
            transitioned_at: Utc::now(),
        });
        self.status = new_state;

        if new_state.is_terminal() {
            self.ended_at = Some(Utc::now());
        }

        &self.transitions[self.transitions.len() - 1]
    }

    /// Enter the terminal state matching the error flag
    pub fn finish(&mut self) {
        let terminal = if self.has_error {
            JobStatus::CompletedWithErrors
        } else {
            JobStatus::Completed
        };
        self.transition_to(terminal);
    }

    pub fn info(&mut self, message: impl Into<String>, file_path: Option<String>) {
        let message = message.into();
        tracing::info!(job_id = %self.job_id, file = ?file_path, "{}", message);
        self.log.push(JobMessage::new(Severity::Info, message, file_path));
    }

    pub fn warn(&mut self, message: impl Into<String>, file_path: Option<String>) {
        let message = message.into();
        tracing::warn!(job_id = %self.job_id, file = ?file_path, "{}", message);
        self.log.push(JobMessage::new(Severity::Warning, message, file_path));
    }

    /// Log a soft job error and raise the job error flag
    pub fn error(&mut self, message: impl Into<String>, file_path: Option<String>) {
        let message = message.into();
        tracing::error!(job_id = %self.job_id, file = ?file_path, "{}", message);
        self.log.push(JobMessage::new(Severity::Error, message, file_path));
        self.has_error = true;
    }

    /// Append to the job comment, `<br/>`-delimited
    pub fn append_to_comment(&mut self, append: &str) {
        if !self.comment.is_empty() {
            self.comment.push_str("<br/>");
        }
        self.comment.push_str(append);
    }

    pub fn into_report(self) -> JobReport {
        JobReport {
            job_id: self.job_id,
            status: self.status,
            rows_linked: self.media_map.len(),
            messages: self.log,
            comment: self.comment,
            spreadsheet_url: self.spreadsheet_url,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}
