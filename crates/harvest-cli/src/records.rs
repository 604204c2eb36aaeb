use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::Context;
use harvest_core::MetadataRecord;
use harvest_crawl::RecordSink;
use serde_jsonlines::JsonLinesWriter;

/// Where a cycle's extracted records go.
pub enum RecordOutput {
    Discard,
    /// Appended as JSON lines, so daemon cycles accumulate in one file.
    JsonLines(JsonLinesWriter<BufWriter<File>>),
}

impl RecordOutput {
    pub fn open(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Discard);
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open record output {}", path.display()))?;
        Ok(Self::JsonLines(JsonLinesWriter::new(BufWriter::new(file))))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Discard => Ok(()),
            Self::JsonLines(writer) => writer.flush(),
        }
    }
}

impl RecordSink for RecordOutput {
    fn accept(&mut self, record: &MetadataRecord) -> io::Result<()> {
        match self {
            Self::Discard => Ok(()),
            Self::JsonLines(writer) => writer.write(record),
        }
    }
}
