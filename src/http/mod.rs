//! HTTP protocol layer module
//!
//! JSON response builders shared by the router and the report endpoints.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_413_response, build_health_response,
    build_options_response, error_response, json_response,
};
