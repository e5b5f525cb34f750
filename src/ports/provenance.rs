// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provenance sink trait definition.
//!
//! This module defines the `ProvenanceSink` port, which records every
//! configuration file the engine reads, in read order. The whole tree
//! appends to a single sink, so the record is a complete, ordered account
//! of what was loaded. A no-op implementation turns recording off entirely
//! for callers that do not want the overhead.

use std::path::{Path, PathBuf};

/// A sink for the ordered record of loaded configuration files.
///
/// Sections append to the sink immediately before each file is parsed, so
/// a file that fails to parse is still on the record. Entries are only
/// ever appended; they are never removed or reordered.
///
/// # Examples
///
/// ```
/// use layercfg::ports::{ProvenanceLog, ProvenanceSink};
/// use std::path::Path;
///
/// let mut log = ProvenanceLog::new();
/// log.record(Path::new("conf/default.yaml"));
/// log.record(Path::new("conf/production.yaml"));
/// assert_eq!(log.files().len(), 2);
/// ```
pub trait ProvenanceSink: Send + Sync + std::fmt::Debug {
    /// Appends a file path to the record.
    fn record(&mut self, path: &Path);

    /// Returns the recorded file paths, in read order.
    ///
    /// Implementations that do not record return an empty slice.
    fn files(&self) -> &[PathBuf];
}

/// The default, recording provenance sink.
#[derive(Debug, Default)]
pub struct ProvenanceLog {
    files: Vec<PathBuf>,
}

impl ProvenanceLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProvenanceSink for ProvenanceLog {
    fn record(&mut self, path: &Path) {
        self.files.push(path.to_path_buf());
    }

    fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// A provenance sink that records nothing.
///
/// Pass this to the tree builder to disable provenance tracking, the
/// deliberate low-overhead mode.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProvenanceSink for NullSink {
    fn record(&mut self, _path: &Path) {}

    fn files(&self) -> &[PathBuf] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_records_in_order() {
        let mut log = ProvenanceLog::new();
        log.record(Path::new("a/default.yaml"));
        log.record(Path::new("a/production.yaml"));
        log.record(Path::new("b/default.yaml"));

        let files: Vec<_> = log.files().iter().map(|p| p.display().to_string()).collect();
        assert_eq!(
            files,
            vec!["a/default.yaml", "a/production.yaml", "b/default.yaml"]
        );
    }

    #[test]
    fn test_log_allows_duplicates() {
        let mut log = ProvenanceLog::new();
        log.record(Path::new("a/default.yaml"));
        log.record(Path::new("a/default.yaml"));
        assert_eq!(log.files().len(), 2);
    }

    #[test]
    fn test_null_sink_records_nothing() {
        let mut sink = NullSink;
        sink.record(Path::new("a/default.yaml"));
        assert!(sink.files().is_empty());
    }
}
