//! Import orchestrator
//!
//! Runs one import job through its states:
//! INITIALIZED → FILE_MAP_BUILT → BATCH_PROCESSING → FINALIZING →
//! COMPLETED | COMPLETED_WITH_ERRORS
//!
//! Each state is handled by a `phase_*` module:
//! - **phase_file_map**: assign extracted media to row identifiers
//! - **phase_batch**: drive the row pipeline, attaching media to rows and
//!   recording what each created resource ended up with
//! - **phase_finalize**: report orphans, rewrite and store the spreadsheet,
//!   clean the temp directory
//!
//! Soft errors (orphans, unresolvable identifiers, rewrite or cleanup
//! failures) are logged into the job and raise its error flag; the job
//! always reaches a terminal state. Only a failing row pipeline aborts the
//! job, after its temp directory has been cleaned.

use crate::error::PipelineError;
use crate::models::{JobArgs, JobReport, JobState};
use crate::services::media_validator::MediaValidator;
use crate::services::path_sandbox::PathSandbox;
use crate::types::{FileStore, RowPipeline};
use std::sync::Arc;
use tokio::task::JoinHandle;
use zimport_common::config::ImportSettings;

mod phase_batch;
mod phase_file_map;
mod phase_finalize;

pub use phase_batch::MediaLinker;

/// Import orchestrator service
pub struct ImportOrchestrator {
    validator: MediaValidator,
    sandbox: PathSandbox,
    store: Arc<dyn FileStore>,
}

impl ImportOrchestrator {
    pub fn new(validator: MediaValidator, sandbox: PathSandbox, store: Arc<dyn FileStore>) -> Self {
        Self {
            validator,
            sandbox,
            store,
        }
    }

    /// Orchestrator confined to the configured temp root
    pub fn from_settings(settings: &ImportSettings, store: Arc<dyn FileStore>) -> Self {
        Self::new(
            MediaValidator::from_settings(settings),
            PathSandbox::new(settings.temp_dir.clone()),
            store,
        )
    }

    pub fn sandbox(&self) -> &PathSandbox {
        &self.sandbox
    }

    /// Run one import job to completion on the current thread
    pub fn execute(
        &self,
        args: JobArgs,
        pipeline: &mut dyn RowPipeline,
    ) -> Result<JobReport, PipelineError> {
        let mut state = JobState::new(&args);

        tracing::info!(
            job_id = %state.job_id,
            spreadsheet = %args.filepath().display(),
            temp = %args.temppath.display(),
            "Import job started"
        );

        self.phase_file_map(&mut state);

        if let Err(e) = self.phase_batch(&mut state, &args, pipeline) {
            tracing::error!(
                job_id = %state.job_id,
                error = %e,
                "Row pipeline failed, aborting job"
            );
            self.clean_temp_files(&mut state);
            return Err(e);
        }

        self.phase_finalize(&mut state, &args);

        tracing::info!(
            job_id = %state.job_id,
            status = ?state.status,
            rows_linked = state.media_map.len(),
            "Import job finished"
        );

        Ok(state.into_report())
    }

    /// Run a job on the blocking pool; the handle resolves to its report
    pub fn dispatch<P>(
        self: &Arc<Self>,
        args: JobArgs,
        mut pipeline: P,
    ) -> JoinHandle<Result<JobReport, PipelineError>>
    where
        P: RowPipeline + Send + 'static,
    {
        let orchestrator = Arc::clone(self);
        tokio::task::spawn_blocking(move || orchestrator.execute(args, &mut pipeline))
    }
}
