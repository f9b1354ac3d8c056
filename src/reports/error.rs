// Report service error taxonomy
// Each variant maps to one HTTP status and one client-facing detail message

use hyper::StatusCode;
use thiserror::Error;

use crate::store::{Document, StoreError};

pub const REPORT_NOT_FOUND: &str = "Report not found";
pub const IMAGE_NUMBER_OUT_OF_RANGE: &str = "Image number must be between 1 and 3";
pub const IMAGE_NUMBER_NOT_INTEGER: &str = "Image number must be an integer";
const INTERNAL_ERROR: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum ReportError {
    /// A request parameter failed its precondition
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// A path parameter could not be parsed into its declared type
    #[error("{0}")]
    Unprocessable(&'static str),

    #[error("Report not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The document parsed but does not have the expected shape
    #[error("{document} document is malformed: {reason}")]
    MalformedDocument {
        document: Document,
        reason: String,
    },
}

impl ReportError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::MalformedDocument { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to the client; data-store faults stay generic
    pub const fn detail(&self) -> &'static str {
        match self {
            Self::InvalidArgument(message) | Self::Unprocessable(message) => *message,
            Self::NotFound => REPORT_NOT_FOUND,
            Self::Store(_) | Self::MalformedDocument { .. } => INTERNAL_ERROR,
        }
    }

    pub fn is_server_fault(&self) -> bool {
        self.status().is_server_error()
    }

    pub fn malformed(document: Document, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            document,
            reason: reason.into(),
        }
    }
}
