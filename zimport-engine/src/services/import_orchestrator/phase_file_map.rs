//! Phase 1: FILE_MAP_BUILT
//!
//! Builds the File Map from the job's spreadsheet path before any row is
//! processed.

use super::ImportOrchestrator;
use crate::models::{JobState, JobStatus};
use crate::services::file_map_builder::FileMapBuilder;

impl ImportOrchestrator {
    pub(super) fn phase_file_map(&self, state: &mut JobState) {
        let scan = FileMapBuilder::new(&self.validator).scan(&state.csv_path);

        for path in &scan.skipped {
            state.info(
                format!("Skipping media import of {}, as it is not valid media.", path.display()),
                Some(path.display().to_string()),
            );
        }

        tracing::info!(
            job_id = %state.job_id,
            identifiers = scan.file_map.len(),
            files = scan.file_map.file_count(),
            "Phase 1: media assigned to row identifiers"
        );

        state.file_map = scan.file_map;
        state.transition_to(JobStatus::FileMapBuilt);
    }
}
