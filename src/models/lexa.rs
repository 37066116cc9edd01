use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Server-side state of an ingestion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Complete,
    PartialSuccess,
    Failed,
    InternalError,
    NotFound,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        self != JobStatus::Processing
    }

    pub fn is_success(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::PartialSuccess)
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            JobStatus::Failed | JobStatus::InternalError | JobStatus::NotFound
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::PartialSuccess => "partial_success",
            JobStatus::Failed => "failed",
            JobStatus::InternalError => "internal_error",
            JobStatus::NotFound => "not_found",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status lookup of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResponse {
    #[serde(alias = "requestID")]
    pub request_id: String,
    pub status: JobStatus,
    /// Percentage, 0 to 100.
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub age_seconds: Option<u64>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub total_chunks: Option<u64>,
    #[serde(default)]
    pub completed_chunks: Option<u64>,
    #[serde(default)]
    pub failed_chunks: Option<u64>,
    #[serde(default)]
    pub processing_chunks: Option<u64>,
    #[serde(default)]
    pub total_files: Option<u64>,
    #[serde(default)]
    pub completed_files: Option<u64>,
    #[serde(default)]
    pub failed_files: Option<u64>,
    #[serde(default)]
    pub processing_files: Option<u64>,
    #[serde(default)]
    pub processed_files: Option<u64>,
    #[serde(default)]
    pub files: Option<Value>,
    #[serde(default)]
    pub errors: Option<Value>,
    #[serde(default)]
    pub error_count: Option<u64>,
}

impl JobResponse {
    /// Parsed documents of a completed job (`result.documents`), empty when absent.
    pub fn documents(&self) -> Vec<Value> {
        self.result
            .as_ref()
            .and_then(|r| r.get("documents"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

/// Acknowledgement of an accepted ingestion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionResult {
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "requestID")]
    pub request_id: String,
    #[serde(default)]
    pub pages: Option<u64>,
    #[serde(default)]
    pub rejects: Option<Vec<Value>>,
    #[serde(default)]
    pub uploads: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    Advanced,
    #[default]
    Default,
}

impl ProcessingMode {
    pub const ALL: [ProcessingMode; 2] = [ProcessingMode::Advanced, ProcessingMode::Default];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingMode::Advanced => "advanced",
            ProcessingMode::Default => "default",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProcessingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = ProcessingMode::ALL.iter().map(|m| m.as_str()).collect();
                Error::validation(format!(
                    "Invalid processing mode: {}. Valid modes are: [{}]",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// Product an ingestion request is billed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Lexa,
    Hippo,
}

impl Product {
    pub fn as_str(self) -> &'static str {
        match self {
            Product::Lexa => "lexa",
            Product::Hippo => "hippo",
        }
    }
}

/// Remote file submitted by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketInfo {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(default, alias = "CreationDate")]
    pub creation_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketListResponse {
    #[serde(default, alias = "requestID")]
    pub request_id: String,
    #[serde(default)]
    pub buckets: Vec<BucketInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderListResponse {
    #[serde(default, alias = "requestID")]
    pub request_id: String,
    #[serde(default)]
    pub folders: Vec<FolderInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "webUrl")]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteListResponse {
    #[serde(default, alias = "requestID")]
    pub request_id: String,
    #[serde(default)]
    pub sites: Vec<SiteInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveInfo {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "driveType")]
    pub drive_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveListResponse {
    #[serde(default, alias = "requestID")]
    pub request_id: String,
    #[serde(default)]
    pub drives: Vec<DriveInfo>,
}
