//! Document store module
//!
//! The report service never touches the filesystem directly. It asks a
//! [`DocumentStore`] for one of three logical documents and gets parsed JSON
//! back. [`FsStore`] re-reads files on every call; [`MemoryStore`] serves
//! fixtures held in memory.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

/// The static documents backing the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    /// GeoJSON feature collection of every report
    ReportsList,
    /// Single canned report detail record
    ReportDetails,
    /// Single canned per-report image set
    ReportImages,
}

impl Document {
    pub const ALL: [Self; 3] = [Self::ReportsList, Self::ReportDetails, Self::ReportImages];

    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::ReportsList => "reports-list.json",
            Self::ReportDetails => "report-details.json",
            Self::ReportImages => "report-images.json",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::ReportsList => "reports list",
            Self::ReportDetails => "report details",
            Self::ReportImages => "report images",
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failures while loading a backing document
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{document} document is not available")]
    Missing { document: Document },

    #[error("failed to read {document} document at {}: {source}", .path.display())]
    Io {
        document: Document,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{document} document is not valid JSON: {source}")]
    Malformed {
        document: Document,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of the backing JSON documents
///
/// Implementations must not cache: every call reflects the current contents
/// of the underlying storage.
pub trait DocumentStore: Send + Sync + 'static {
    fn load(&self, document: Document) -> impl Future<Output = Result<Value, StoreError>> + Send;
}
