//! Report query service
//!
//! Three read-only lookups against the static documents:
//! - the full reports feature collection, returned verbatim
//! - the canned report detail, returned when its `id` matches
//! - one of three images from the canned image set, returned when its
//!   `reportId` matches
//!
//! Every call loads its document fresh from the store.

mod error;

pub use error::ReportError;

use error::{IMAGE_NUMBER_NOT_INTEGER, IMAGE_NUMBER_OUT_OF_RANGE};

use serde_json::Value;
use std::fmt;
use std::num::IntErrorKind;

use crate::store::{Document, DocumentStore};

/// Position of an image within a report's image set, always in `1..=3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageNumber(u8);

impl ImageNumber {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 3;

    pub fn new(number: i64) -> Result<Self, ReportError> {
        if !(Self::MIN..=Self::MAX).contains(&number) {
            return Err(ReportError::InvalidArgument(IMAGE_NUMBER_OUT_OF_RANGE));
        }
        u8::try_from(number)
            .map(Self)
            .map_err(|_| ReportError::InvalidArgument(IMAGE_NUMBER_OUT_OF_RANGE))
    }

    /// Parse a path segment. Non-integers are unprocessable; integers too
    /// large for `i64` are still integers and fail the range check.
    pub fn parse(segment: &str) -> Result<i64, ReportError> {
        segment.parse::<i64>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                ReportError::InvalidArgument(IMAGE_NUMBER_OUT_OF_RANGE)
            }
            _ => ReportError::Unprocessable(IMAGE_NUMBER_NOT_INTEGER),
        })
    }
}

impl fmt::Display for ImageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Report query service over a document store
#[derive(Debug, Clone)]
pub struct ReportService<S> {
    store: S,
}

impl<S: DocumentStore> ReportService<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Return the "all reports" feature collection exactly as stored
    pub async fn list_reports(&self) -> Result<Value, ReportError> {
        Ok(self.store.load(Document::ReportsList).await?)
    }

    /// Return the detail document if its embedded `id` equals `report_id`
    pub async fn get_report(&self, report_id: &str) -> Result<Value, ReportError> {
        let detail = self.store.load(Document::ReportDetails).await?;
        let embedded_id = detail
            .get("id")
            .ok_or_else(|| ReportError::malformed(Document::ReportDetails, "missing field `id`"))?;

        // A non-string id never equals a path segment
        if embedded_id.as_str() != Some(report_id) {
            return Err(ReportError::NotFound);
        }
        Ok(detail)
    }

    /// Return image `image_number` of the image set if its `reportId` equals
    /// `report_id`. The range check runs before the store is consulted.
    pub async fn get_report_image(
        &self,
        report_id: &str,
        image_number: i64,
    ) -> Result<Value, ReportError> {
        let image_number = ImageNumber::new(image_number)?;

        let mut image_set = self.store.load(Document::ReportImages).await?;
        let embedded_id = image_set.get("reportId").ok_or_else(|| {
            ReportError::malformed(Document::ReportImages, "missing field `reportId`")
        })?;

        if embedded_id.as_str() != Some(report_id) {
            return Err(ReportError::NotFound);
        }

        let images = image_set
            .get_mut("images")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ReportError::malformed(Document::ReportImages, "missing object field `images`"))?;

        images.remove(&image_number.to_string()).ok_or_else(|| {
            ReportError::malformed(
                Document::ReportImages,
                format!("no entry for image {image_number}"),
            )
        })
    }
}
