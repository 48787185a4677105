//! Local in-memory catalog
//!
//! Reference row pipeline: reads a delimited spreadsheet in batches and
//! creates one in-memory resource per data row. Media attached to a row are
//! ingested through the [`TempFileIngester`] and their originals stored in a
//! [`FileStore`] at `original/{uuid}.{ext}`.
//!
//! A row whose media cannot be ingested or stored is not created; it is
//! counted in [`PipelineOutcome::row_errors`].

use crate::error::PipelineError;
use crate::models::JobArgs;
use crate::services::temp_file_ingester::{ErrorStore, StagedMedia, TempFileIngester};
use crate::types::{
    BatchHooks, FileStore, PipelineOutcome, ResourceReader, ResourceReference, RowData,
    RowPipeline,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Resource name reported for every created resource
pub const RESOURCE_NAME: &str = "items";

/// Media attached to a catalog resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMedia {
    pub original_name: String,
    pub media_type: String,
    /// Storage path of the original, when it was stored
    pub storage_path: Option<String>,
    pub url: Option<String>,
}

/// A resource created from one spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogResource {
    pub id: i64,
    pub row_number: usize,
    /// Declared unique identifier; `None` when the row's cell is empty
    pub identifier: Option<String>,
    /// Header → cell value
    pub values: BTreeMap<String, String>,
    pub media: Vec<CatalogMedia>,
}

pub struct LocalCatalog {
    store: Arc<dyn FileStore>,
    ingester: TempFileIngester,
    resources: BTreeMap<i64, CatalogResource>,
    next_id: i64,
}

impl LocalCatalog {
    pub fn new(store: Arc<dyn FileStore>, ingester: TempFileIngester) -> Self {
        Self {
            store,
            ingester,
            resources: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn resource(&self, id: i64) -> Option<&CatalogResource> {
        self.resources.get(&id)
    }

    pub fn resources(&self) -> impl Iterator<Item = &CatalogResource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn process_batch(
        &mut self,
        headers: &[String],
        batch: &mut Vec<RowData>,
        hooks: &mut dyn BatchHooks,
        outcome: &mut PipelineOutcome,
    ) {
        hooks.before_batch(batch);

        for row in batch.drain(..) {
            outcome.rows_processed += 1;

            let Some(resource) = self.create_resource(headers, row) else {
                outcome.row_errors += 1;
                continue;
            };

            let reference = ResourceReference {
                id: resource.id,
                resource_name: RESOURCE_NAME.to_string(),
            };
            self.resources.insert(resource.id, resource);
            hooks.after_resource(&reference, &*self);
        }
    }

    fn create_resource(&mut self, headers: &[String], row: RowData) -> Option<CatalogResource> {
        let mut media = Vec::with_capacity(row.media.len());
        let mut errors = ErrorStore::new();

        for instruction in &row.media {
            let Some(staged) = self.ingester.ingest(instruction, &mut errors) else {
                continue;
            };
            let stored = self.store_media(&staged);
            staged.discard();
            match stored {
                Some(item) => media.push(item),
                None => {
                    errors.add_error("file", format!("Failed to store {}", staged.original_name))
                }
            }
        }

        if errors.has_errors() {
            for (field, message) in errors.messages() {
                tracing::warn!(row = row.row_number, field, "{}", message);
            }
            return None;
        }

        let values = headers
            .iter()
            .cloned()
            .zip(row.values.iter().cloned())
            .collect();

        let id = self.next_id;
        self.next_id += 1;

        Some(CatalogResource {
            id,
            row_number: row.row_number,
            identifier: Some(row.identifier).filter(|identifier| !identifier.is_empty()),
            values,
            media,
        })
    }

    fn store_media(&self, staged: &StagedMedia) -> Option<CatalogMedia> {
        let mut item = CatalogMedia {
            original_name: staged.original_name.clone(),
            media_type: staged.media_type.clone(),
            storage_path: None,
            url: None,
        };

        if !staged.store_original {
            return Some(item);
        }

        let storage_path = match &staged.extension {
            Some(ext) => format!("original/{}.{}", Uuid::new_v4().simple(), ext),
            None => format!("original/{}", Uuid::new_v4().simple()),
        };

        if let Err(e) = self.store.put(&staged.staged_path, &storage_path) {
            tracing::error!(file = %staged.original_name, error = %e, "Failed to store media");
            return None;
        }

        item.url = Some(self.store.uri(&storage_path));
        item.storage_path = Some(storage_path);
        Some(item)
    }
}

impl ResourceReader for LocalCatalog {
    fn identifier_value(
        &self,
        resource: &ResourceReference,
    ) -> Result<Option<String>, PipelineError> {
        self.resources
            .get(&resource.id)
            .map(|r| r.identifier.clone())
            .ok_or(PipelineError::ResourceNotFound(resource.id))
    }

    fn media_urls(&self, resource: &ResourceReference) -> Result<Vec<String>, PipelineError> {
        self.resources
            .get(&resource.id)
            .map(|r| r.media.iter().filter_map(|m| m.url.clone()).collect())
            .ok_or(PipelineError::ResourceNotFound(resource.id))
    }
}

impl RowPipeline for LocalCatalog {
    fn run(
        &mut self,
        args: &JobArgs,
        hooks: &mut dyn BatchHooks,
    ) -> Result<PipelineOutcome, PipelineError> {
        let source = &args.source;
        if !source.kind.is_delimited() {
            return Err(PipelineError::UnsupportedSource(source.kind.media_type().to_string()));
        }

        let mut reader = source.dialect.reader_builder().from_path(&source.path)?;
        let mut records = reader.records();

        let headers: Vec<String> = match records.next() {
            Some(header) => header?.iter().map(|h| h.trim().to_string()).collect(),
            None => return Ok(PipelineOutcome::default()),
        };

        let batch_size = args.rows_per_batch.max(1);
        let mut batch = Vec::with_capacity(batch_size);
        let mut outcome = PipelineOutcome::default();

        for (index, record) in records.enumerate() {
            let record = record?;
            let values: Vec<String> = record.iter().map(str::to_string).collect();
            let identifier = values
                .get(args.identifier_column)
                .map(|v| v.trim().to_string())
                .unwrap_or_default();

            batch.push(RowData {
                row_number: index + 1,
                identifier,
                values,
                media: Vec::new(),
            });

            if batch.len() == batch_size {
                self.process_batch(&headers, &mut batch, hooks, &mut outcome);
            }
        }

        if !batch.is_empty() {
            self.process_batch(&headers, &mut batch, hooks, &mut outcome);
        }

        tracing::info!(
            spreadsheet = %source.path.display(),
            rows = outcome.rows_processed,
            row_errors = outcome.row_errors,
            "Row import finished"
        );

        Ok(outcome)
    }
}
