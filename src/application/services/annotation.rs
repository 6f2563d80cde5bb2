//! Annotation service
//!
//! Loads the entity records and the evolution forest, annotates the records
//! and writes one file per record.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::error_ext::{IoResultExt, JsonResultExt};
use crate::application::format::from_json_str;
use crate::application::writer::RecordWriter;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{
    annotate, render_forest, AnnotateOptions, AnnotationPolicy, AnnotationSummary, EntityRecord,
    EntityTable, EvolutionNode,
};
use crate::infrastructure::traits::FileSystem;

/// Inputs, outputs and policy for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateRequest {
    pub entities_file: PathBuf,
    pub forest_file: PathBuf,
    pub output_dir: PathBuf,
    pub policy: AnnotationPolicy,
    pub options: AnnotateOptions,
    /// Annotate but do not touch the filesystem
    pub dry_run: bool,
}

impl AnnotateRequest {
    /// Request built from configured defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            entities_file: settings.entities_file.clone(),
            forest_file: settings.forest_file.clone(),
            output_dir: settings.output_dir_for(settings.policy),
            policy: settings.policy,
            options: settings.annotate,
            dry_run: false,
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct AnnotateReport {
    pub output_dir: PathBuf,
    /// Files written (or that would be written on a dry run), in input order
    pub files: Vec<PathBuf>,
    pub summary: AnnotationSummary,
    pub dry_run: bool,
}

/// Service running load → annotate → write.
pub struct AnnotationService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl AnnotationService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Load and validate the entity records.
    #[instrument(level = "debug", skip(self))]
    pub fn load_entities(&self, path: &Path) -> ApplicationResult<Vec<EntityRecord>> {
        let content = self
            .fs
            .read_to_string(path)
            .with_read_context(path)?;
        let value: Value = from_json_str(&content).with_json_context(path)?;
        let records = EntityRecord::from_array(value)?;
        debug!("loaded {} entity records", records.len());
        Ok(records)
    }

    /// Load the evolution forest.
    #[instrument(level = "debug", skip(self))]
    pub fn load_forest(&self, path: &Path) -> ApplicationResult<Vec<EvolutionNode>> {
        let content = self
            .fs
            .read_to_string(path)
            .with_read_context(path)?;
        let forest: Vec<EvolutionNode> = from_json_str(&content).with_json_context(path)?;
        debug!(
            "loaded {} evolution trees ({} nodes)",
            forest.len(),
            forest.iter().map(EvolutionNode::size).sum::<usize>()
        );
        Ok(forest)
    }

    /// Run the full pipeline.
    ///
    /// Both inputs are loaded before anything is written. Any error aborts
    /// the run; files written before the error stay on disk.
    #[instrument(level = "debug", skip(self, on_written))]
    pub fn run(
        &self,
        request: &AnnotateRequest,
        on_written: impl FnMut(&Path),
    ) -> ApplicationResult<AnnotateReport> {
        let records = self.load_entities(&request.entities_file)?;
        let forest = self.load_forest(&request.forest_file)?;

        let mut table = EntityTable::build(records);
        let summary = annotate(&forest, &mut table, request.policy, request.options);
        info!(
            policy = %request.policy,
            annotated = summary.annotated,
            unmatched = summary.unmatched,
            "annotation complete"
        );

        let records = table.into_records();
        let files = if request.dry_run {
            records
                .iter()
                .map(|record| RecordWriter::target(&request.output_dir, record))
                .collect()
        } else {
            RecordWriter::new(self.fs.clone(), self.settings.output.clone()).write_all(
                &request.output_dir,
                &records,
                on_written,
            )?
        };

        Ok(AnnotateReport {
            output_dir: request.output_dir.clone(),
            files,
            summary,
            dry_run: request.dry_run,
        })
    }

    /// Render the forest with matched/unmatched markers.
    #[instrument(level = "debug", skip(self))]
    pub fn render(
        &self,
        entities_file: &Path,
        forest_file: &Path,
    ) -> ApplicationResult<Vec<Tree<String>>> {
        let table = EntityTable::build(self.load_entities(entities_file)?);
        let forest = self.load_forest(forest_file)?;
        Ok(render_forest(&forest, &table))
    }
}
