//! One-file-per-record writer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::error_ext::{IoResultExt, JsonResultExt};
use crate::application::format::{to_json_string, OutputOptions};
use crate::application::ApplicationResult;
use crate::domain::EntityRecord;
use crate::infrastructure::traits::FileSystem;

/// Writes each record to `<output_dir>/<order:03>_<name>.json`.
///
/// Not atomic: a failure mid-loop leaves the files written so far in place.
pub struct RecordWriter {
    fs: Arc<dyn FileSystem>,
    options: OutputOptions,
}

impl RecordWriter {
    pub fn new(fs: Arc<dyn FileSystem>, options: OutputOptions) -> Self {
        Self { fs, options }
    }

    /// Target path for `record` under `output_dir`.
    pub fn target(output_dir: &Path, record: &EntityRecord) -> PathBuf {
        output_dir.join(record.file_name())
    }

    /// Write all records in input order.
    ///
    /// `on_written` is called after every successful write; existing files
    /// with the same name are overwritten.
    #[instrument(level = "debug", skip(self, records, on_written))]
    pub fn write_all(
        &self,
        output_dir: &Path,
        records: &[EntityRecord],
        mut on_written: impl FnMut(&Path),
    ) -> ApplicationResult<Vec<PathBuf>> {
        self.fs
            .create_dir_all(output_dir)
            .with_path_context("create output directory", output_dir)?;

        let mut written = Vec::with_capacity(records.len());
        for record in records {
            let target = Self::target(output_dir, record);
            let json = to_json_string(record, &self.options).with_serialize_context(&target)?;
            self.fs
                .write(&target, &json)
                .with_path_context("write record", &target)?;
            info!(file = %target.display(), "Created file");
            on_written(&target);
            written.push(target);
        }
        Ok(written)
    }
}
