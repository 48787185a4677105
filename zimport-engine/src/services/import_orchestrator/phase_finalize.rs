//! Phase 3: FINALIZING
//!
//! Entered once after the row pipeline returns, whatever happened to
//! individual rows:
//! 1. media left in the File Map is reported as orphaned
//! 2. the spreadsheet is rewritten, stored, and linked from the job comment
//! 3. the temp directory is removed
//!
//! Every step runs even when an earlier one failed.

use super::ImportOrchestrator;
use crate::error::RewriteError;
use crate::models::archive_source::file_name_of;
use crate::models::{JobArgs, JobState, JobStatus};
use crate::services::path_sandbox::SandboxOutcome;
use crate::services::spreadsheet_rewriter;
use uuid::Uuid;

/// Prefix of the storage path results are stored under
pub(crate) const RESULT_PREFIX: &str = "uploads/zimport";

impl ImportOrchestrator {
    pub(super) fn phase_finalize(&self, state: &mut JobState, args: &JobArgs) {
        state.transition_to(JobStatus::Finalizing);
        tracing::info!(job_id = %state.job_id, "Phase 3: finalizing");

        self.report_orphans(state);

        if let Err(e) = self.write_spreadsheet(state, args) {
            state.error(format!("Could not modify the CSV\n{}", e), None);
        }

        self.clean_temp_files(state);

        state.finish();
    }

    fn report_orphans(&self, state: &mut JobState) {
        if state.file_map.is_empty() {
            return;
        }

        let orphans: Vec<(String, String)> = state
            .file_map
            .iter()
            .flat_map(|(identifier, entries)| {
                entries.iter().map(move |entry| {
                    (identifier.to_string(), entry.file_path.display().to_string())
                })
            })
            .collect();

        for (identifier, path) in orphans {
            state.error(
                format!(
                    "Media not imported: {}\n   Reason: ID '{}' not present in csv.",
                    path, identifier
                ),
                Some(path),
            );
        }

        state.error(
            "Some media was present in the archive but didn't correspond to a row in the csv. \
             See above for details.",
            None,
        );
    }

    /// Rewrite the spreadsheet and publish it through the file store
    ///
    /// A source that cannot be rewritten is published unchanged.
    fn write_spreadsheet(&self, state: &mut JobState, args: &JobArgs) -> Result<(), RewriteError> {
        let source = &args.source;
        let rewritten = spreadsheet_rewriter::rewrite(
            &source.path,
            &source.kind,
            &source.dialect,
            args.identifier_column,
            &state.media_map,
            &args.multivalue_separator,
        )?;

        if rewritten.is_none() {
            state.warn(
                "Only CSV and TSV files can be modified. No changes have been made to the provided document.",
                Some(source.path.display().to_string()),
            );
        }
        let publish = rewritten.unwrap_or_else(|| source.path.clone());

        let file_name = escape_html(&file_name_of(&source.path));
        let relative_path = format!("{}/{}/{}", RESULT_PREFIX, Uuid::new_v4().simple(), file_name);

        self.store.put(&publish, &relative_path)?;
        let url = self.store.uri(&relative_path);

        state.append_to_comment(&format!(
            "<a href='{}' download='{}'>Updated CSV</a>",
            url, file_name
        ));
        state.spreadsheet_url = Some(url);
        Ok(())
    }

    /// Remove the job's temp directory; failure marks the job errored
    pub(super) fn clean_temp_files(&self, state: &mut JobState) {
        let temp_path = state.temp_path.clone();
        match self.sandbox.delete_recursive(&temp_path) {
            Ok(SandboxOutcome::Applied) => {
                tracing::debug!(
                    job_id = %state.job_id,
                    temp = %temp_path.display(),
                    "Temp files removed"
                );
            }
            Ok(SandboxOutcome::Rejected) => {
                state.error(
                    format!(
                        "Could not clean temp files\n{} is outside the temp directory",
                        temp_path.display()
                    ),
                    Some(temp_path.display().to_string()),
                );
            }
            Err(e) => {
                state.error(
                    format!("Could not clean temp files\n{}", e),
                    Some(temp_path.display().to_string()),
                );
            }
        }
    }
}

/// Escape text for an HTML attribute or element body
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
