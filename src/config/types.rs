// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

use crate::store::Document;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub data: DataConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_path() -> String {
    "/healthz".to_string()
}

/// Locations of the backing JSON documents
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DataConfig {
    /// Directory the document file names are resolved against
    pub dir: PathBuf,
    pub reports_list: String,
    pub report_details: String,
    pub report_images: String,
}

impl DataConfig {
    /// Resolve a logical document to its file on disk
    pub fn path_for(&self, document: Document) -> PathBuf {
        let file_name = match document {
            Document::ReportsList => &self.reports_list,
            Document::ReportDetails => &self.report_details,
            Document::ReportImages => &self.report_images,
        };
        self.dir.join(file_name)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            reports_list: Document::ReportsList.default_file_name().to_string(),
            report_details: Document::ReportDetails.default_file_name().to_string(),
            report_images: Document::ReportImages.default_file_name().to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: "report-mock-api".to_string(),
            enable_cors: true,
            max_body_size: 1_048_576,
            health_path: default_health_path(),
        }
    }
}
