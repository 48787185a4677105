//! Phase 2: BATCH_PROCESSING
//!
//! The row pipeline owns the loop; the orchestrator participates through
//! [`MediaLinker`]:
//! - before a batch is created, every row takes the File Map entries for its
//!   identifier (removing them from the map)
//! - after a resource is created, its identifier and media URLs are recorded
//!   in the Media Map

use super::ImportOrchestrator;
use crate::error::PipelineError;
use crate::models::{JobArgs, JobState, JobStatus, MediaMapEntry};
use crate::types::{
    BatchHooks, IngestInstruction, PipelineOutcome, ResourceReader, ResourceReference, RowData,
    RowPipeline,
};

/// Batch hooks linking File Map entries to rows and rows to resources
pub struct MediaLinker<'a> {
    state: &'a mut JobState,
}

impl<'a> MediaLinker<'a> {
    pub fn new(state: &'a mut JobState) -> Self {
        Self { state }
    }
}

impl BatchHooks for MediaLinker<'_> {
    fn before_batch(&mut self, rows: &mut [RowData]) {
        for row in rows.iter_mut() {
            if row.identifier.is_empty() {
                continue;
            }
            let entries = self.state.file_map.take(&row.identifier);
            if !entries.is_empty() {
                tracing::debug!(
                    job_id = %self.state.job_id,
                    row = row.row_number,
                    identifier = %row.identifier,
                    files = entries.len(),
                    "Attaching media to row"
                );
            }
            row.media.extend(entries.into_iter().map(IngestInstruction::from));
        }
    }

    fn after_resource(&mut self, resource: &ResourceReference, reader: &dyn ResourceReader) {
        let identifier = match reader.identifier_value(resource) {
            Ok(Some(identifier)) if !identifier.is_empty() => identifier,
            Ok(_) => {
                self.state.error(
                    format!(
                        "Was unable to determine a suitable csv identifier for resource with id '{}'",
                        resource.id
                    ),
                    None,
                );
                return;
            }
            Err(e) => {
                self.state.error(
                    format!(
                        "Resource identifier lookup failed for resource with id '{}': {}",
                        resource.id, e
                    ),
                    None,
                );
                return;
            }
        };

        let media_urls = match reader.media_urls(resource) {
            Ok(urls) => urls,
            Err(e) => {
                self.state.error(format!("Resource media lookup failed: {}", e), None);
                return;
            }
        };

        self.state.media_map.insert(MediaMapEntry {
            identifier,
            resource_id: resource.id,
            media_urls,
        });
    }
}

impl ImportOrchestrator {
    pub(super) fn phase_batch(
        &self,
        state: &mut JobState,
        args: &JobArgs,
        pipeline: &mut dyn RowPipeline,
    ) -> Result<PipelineOutcome, PipelineError> {
        state.transition_to(JobStatus::BatchProcessing);
        tracing::info!(
            job_id = %state.job_id,
            rows_per_batch = args.rows_per_batch,
            "Phase 2: row import"
        );

        let outcome = pipeline.run(args, &mut MediaLinker::new(state))?;

        if outcome.row_errors > 0 {
            state.warn(
                format!(
                    "{} of {} rows could not be imported",
                    outcome.row_errors, outcome.rows_processed
                ),
                None,
            );
        }

        Ok(outcome)
    }
}
