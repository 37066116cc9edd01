//! Shared ingestion service used by Lexa and Hippo.
//!
//! Uploads go to the data API: local files and raw bytes as multipart,
//! URLs as JSON after a HEAD probe, and cloud-storage folders by reference.
//! The `product` query/body field selects who consumes the result.
//!
//! # Structure
//!
//! - `file_info` - name/type derivation for URL uploads
//! - `poller` - job status lookup and the polling loop

pub mod file_info;
pub mod poller;

use async_trait::async_trait;
use log::{debug, info};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auth::Session;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, FilePart};
use crate::models::{IngestionResult, JobResponse, ProcessingMode, Product};
use crate::runtime::{RealRuntime, Runtime};

pub use poller::{JobPoller, JobStatusSource, ProgressCallback, validate_request_id};

/// A file to upload: a path on disk or in-memory content.
#[derive(Debug, Clone, PartialEq)]
pub enum FileInput {
    Path(PathBuf),
    Bytes {
        name: Option<String>,
        content: Vec<u8>,
    },
}

impl FileInput {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        FileInput::Path(path.into())
    }

    pub fn named_bytes(name: impl Into<String>, content: Vec<u8>) -> Self {
        FileInput::Bytes {
            name: Some(name.into()),
            content,
        }
    }
}

impl From<PathBuf> for FileInput {
    fn from(path: PathBuf) -> Self {
        FileInput::Path(path)
    }
}

impl From<&Path> for FileInput {
    fn from(path: &Path) -> Self {
        FileInput::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for FileInput {
    fn from(content: Vec<u8>) -> Self {
        FileInput::Bytes {
            name: None,
            content,
        }
    }
}

/// Cloud storage location to ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudSource {
    S3 { bucket: String, path: String },
    Box { folder_id: String },
    Dropbox { path: String },
    SharePoint { drive_id: String, folder_id: String },
    Salesforce { name: String },
    Sendme { ticket: String },
}

impl CloudSource {
    fn endpoint(&self) -> &'static str {
        match self {
            CloudSource::S3 { .. } => "/v0/amazon-folder",
            CloudSource::Box { .. } => "/v0/box-folder",
            CloudSource::Dropbox { .. } => "/v0/dropbox-folder",
            CloudSource::SharePoint { .. } => "/v0/microsoft-folder",
            CloudSource::Salesforce { .. } => "/v0/salesforce-folder",
            CloudSource::Sendme { .. } => "/v0/sendme",
        }
    }

    fn fields(&self) -> Map<String, Value> {
        let value = match self {
            CloudSource::S3 { bucket, path } => json!({"bucket": bucket, "path": path}),
            CloudSource::Box { folder_id } => json!({"box_folder_id": folder_id}),
            CloudSource::Dropbox { path } => json!({"path": path}),
            CloudSource::SharePoint {
                drive_id,
                folder_id,
            } => json!({"drive_id": drive_id, "sharepoint_folder_id": folder_id}),
            CloudSource::Salesforce { name } => json!({"name": name}),
            CloudSource::Sendme { ticket } => json!({"ticket": ticket}),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

pub struct Ingest<R: Runtime = RealRuntime> {
    session: Arc<Session>,
    runtime: R,
    product: Product,
}

impl Ingest<RealRuntime> {
    pub fn new(session: Arc<Session>, product: Product) -> Self {
        Self::with_runtime(session, product, RealRuntime)
    }
}

impl<R: Runtime> Ingest<R> {
    pub fn with_runtime(session: Arc<Session>, product: Product, runtime: R) -> Self {
        Self {
            session,
            runtime,
            product,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn product(&self) -> Product {
        self.product
    }

    /// Uploads files as one multipart request.
    #[tracing::instrument(skip(self, files))]
    pub async fn upload_files(
        &self,
        files: Vec<FileInput>,
        mode: ProcessingMode,
        folder_id: Option<&str>,
    ) -> Result<IngestionResult> {
        if files.is_empty() {
            return Err(Error::validation("At least one file must be provided"));
        }

        let parts = files
            .into_iter()
            .enumerate()
            .map(|(i, file)| self.file_part("files", i, file))
            .collect::<Result<Vec<_>>>()?;
        debug!("Uploading {} file(s) in {} mode", parts.len(), mode);

        let request = ApiRequest::post(self.session.data_url("/v0/files"))
            .query("mode", mode)
            .query("product", self.product.as_str())
            .query_opt("folder_id", folder_id)
            .multipart(parts);

        let result: IngestionResult = self.session.request_as(request).await?;
        info!("Upload accepted, request id {}", result.request_id);
        Ok(result)
    }

    /// Reads `file` into a multipart part named `field`. Unnamed content is
    /// called `file_<index>.bin`.
    pub(crate) fn file_part(
        &self,
        field: &str,
        index: usize,
        file: FileInput,
    ) -> Result<FilePart> {
        match file {
            FileInput::Path(path) => {
                if !self.runtime.exists(&path) {
                    return Err(Error::validation(format!(
                        "File not found: {}",
                        path.display()
                    )));
                }
                if !self.runtime.is_file(&path) {
                    return Err(Error::validation(format!("Not a file: {}", path.display())));
                }
                let content = self
                    .runtime
                    .read(&path)
                    .map_err(|e| Error::io(format!("{:#}", e)))?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("file_{}.bin", index));
                Ok(FilePart::new(field, filename, content))
            }
            FileInput::Bytes { name, content } => {
                let filename = name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("file_{}.bin", index));
                Ok(FilePart::new(field, filename, content))
            }
        }
    }

    /// Submits remote files by URL after resolving their name and type.
    #[tracing::instrument(skip(self, urls))]
    pub async fn upload_urls(
        &self,
        urls: &[String],
        mode: ProcessingMode,
        folder_id: Option<&str>,
    ) -> Result<IngestionResult> {
        if urls.is_empty() {
            return Err(Error::validation("At least one file url must be provided"));
        }
        if let Some(bad) = urls
            .iter()
            .find(|u| !u.starts_with("http://") && !u.starts_with("https://"))
        {
            return Err(Error::validation(format!("Invalid URL format: {}", bad)));
        }

        let mut files = Vec::with_capacity(urls.len());
        for url in urls {
            files.push(file_info::resolve(self.session.http(), url).await);
        }

        let mut body = json!({
            "files": files,
            "mode": mode,
            "product": self.product,
        });
        if let Some(folder_id) = folder_id {
            body["folder_id"] = json!(folder_id);
        }

        let request = ApiRequest::post(self.session.data_url("/v0/file-urls")).json(&body)?;
        self.session.request_as(request).await
    }

    /// Ingests a cloud storage folder by reference.
    #[tracing::instrument(skip(self))]
    pub async fn upload_cloud(
        &self,
        source: &CloudSource,
        mode: ProcessingMode,
        folder_id: Option<&str>,
    ) -> Result<IngestionResult> {
        let mut body = source.fields();
        body.insert("mode".into(), json!(mode));
        body.insert("product".into(), json!(self.product));
        if let Some(folder_id) = folder_id {
            body.insert("folder_id".into(), json!(folder_id));
        }

        let request = ApiRequest::post(self.session.data_url(source.endpoint())).json(&body)?;
        self.session.request_as(request).await
    }

    /// `GET /v0/job/{request_id}`.
    #[tracing::instrument(skip(self))]
    pub async fn get_job_status(&self, request_id: &str) -> Result<JobResponse> {
        validate_request_id(request_id)?;
        let url = self
            .session
            .data_url(&format!("/v0/job/{}", request_id.trim()));
        self.session.request_as(ApiRequest::get(url)).await
    }
}

#[async_trait]
impl<R: Runtime> JobStatusSource for Ingest<R> {
    async fn job_status(&self, request_id: &str) -> Result<JobResponse> {
        self.get_job_status(request_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::session;
    use crate::error::ErrorKind;
    use crate::runtime::MockRuntime;
    use mockito::Matcher;

    const ACCEPTED: &str = r#"{"message": "Upload accepted", "request_id": "req-1"}"#;

    #[tokio::test]
    async fn test_upload_bytes_names_unnamed_parts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v0/files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("mode".into(), "advanced".into()),
                Matcher::UrlEncoded("product".into(), "lexa".into()),
            ]))
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"filename="file_0.bin""#.into()),
                Matcher::Regex(r#"filename="notes.txt""#.into()),
            ]))
            .with_status(200)
            .with_body(ACCEPTED)
            .create_async()
            .await;

        let ingest = Ingest::new(session(&server.url()), Product::Lexa);
        let result = ingest
            .upload_files(
                vec![
                    FileInput::from(b"raw".to_vec()),
                    FileInput::named_bytes("notes.txt", b"hello".to_vec()),
                ],
                ProcessingMode::Advanced,
                None,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.request_id, "req-1");
    }

    #[tokio::test]
    async fn test_upload_path_with_folder_for_hippo() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v0/files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("product".into(), "hippo".into()),
                Matcher::UrlEncoded("folder_id".into(), "folder-9".into()),
            ]))
            .match_body(Matcher::Regex(r#"filename="contract.pdf""#.into()))
            .with_status(200)
            .with_body(ACCEPTED)
            .create_async()
            .await;

        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_is_file().returning(|_| true);
        runtime.expect_read().returning(|_| Ok(b"%PDF".to_vec()));

        let ingest = Ingest::with_runtime(session(&server.url()), Product::Hippo, runtime);
        ingest
            .upload_files(
                vec![FileInput::path("/data/contract.pdf")],
                ProcessingMode::Default,
                Some("folder-9"),
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .returning(|p| p != Path::new("/missing.pdf"));
        runtime
            .expect_is_file()
            .returning(|p| p != Path::new("/some/dir"));

        let ingest = Ingest::with_runtime(
            session("http://127.0.0.1:1"),
            Product::Lexa,
            runtime,
        );

        let err = ingest
            .upload_files(vec![], ProcessingMode::Default, None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "At least one file must be provided");

        let err = ingest
            .upload_files(vec![FileInput::path("/missing.pdf")], ProcessingMode::Default, None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "File not found: /missing.pdf");

        let err = ingest
            .upload_files(vec![FileInput::path("/some/dir")], ProcessingMode::Default, None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Not a file: /some/dir");
    }

    #[tokio::test]
    async fn test_upload_read_failure_is_io_error() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_is_file().returning(|_| true);
        runtime
            .expect_read()
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let ingest = Ingest::with_runtime(session("http://127.0.0.1:1"), Product::Lexa, runtime);
        let err = ingest
            .upload_files(vec![FileInput::path("/locked.pdf")], ProcessingMode::Default, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::Io);
        assert!(err.message().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_upload_urls() {
        let mut server = mockito::Server::new_async().await;
        let head = server
            .mock("HEAD", "/files/report.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .create_async()
            .await;
        let file_url = format!("{}/files/report.pdf", server.url());
        let upload = server
            .mock("POST", "/v0/file-urls")
            .match_body(Matcher::Json(json!({
                "files": [{"name": "report.pdf", "url": file_url, "type": "application/pdf"}],
                "mode": "default",
                "product": "lexa"
            })))
            .with_status(200)
            .with_body(ACCEPTED)
            .create_async()
            .await;

        let ingest = Ingest::new(session(&server.url()), Product::Lexa);
        let result = ingest
            .upload_urls(&[file_url.clone()], ProcessingMode::Default, None)
            .await
            .unwrap();

        head.assert_async().await;
        upload.assert_async().await;
        assert_eq!(result.message, "Upload accepted");
    }

    #[tokio::test]
    async fn test_upload_urls_validation() {
        let ingest = Ingest::new(session("http://127.0.0.1:1"), Product::Lexa);

        let err = ingest
            .upload_urls(&[], ProcessingMode::Default, None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "At least one file url must be provided");

        let err = ingest
            .upload_urls(&["ftp://example.com/a.pdf".to_string()], ProcessingMode::Default, None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invalid URL format: ftp://example.com/a.pdf");
    }

    #[tokio::test]
    async fn test_upload_cloud_sources() {
        let cases = vec![
            (
                CloudSource::S3 {
                    bucket: "docs".into(),
                    path: "reports/".into(),
                },
                "/v0/amazon-folder",
                json!({"bucket": "docs", "path": "reports/"}),
            ),
            (
                CloudSource::Box {
                    folder_id: "123".into(),
                },
                "/v0/box-folder",
                json!({"box_folder_id": "123"}),
            ),
            (
                CloudSource::SharePoint {
                    drive_id: "d1".into(),
                    folder_id: "f1".into(),
                },
                "/v0/microsoft-folder",
                json!({"drive_id": "d1", "sharepoint_folder_id": "f1"}),
            ),
            (
                CloudSource::Sendme {
                    ticket: "t-1".into(),
                },
                "/v0/sendme",
                json!({"ticket": "t-1"}),
            ),
        ];

        for (source, path, fields) in cases {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("POST", path)
                .match_body(Matcher::AllOf(vec![
                    Matcher::PartialJson(fields),
                    Matcher::PartialJson(json!({
                        "mode": "advanced",
                        "product": "hippo",
                        "folder_id": "hippo-folder"
                    })),
                ]))
                .with_status(200)
                .with_body(ACCEPTED)
                .create_async()
                .await;

            let ingest = Ingest::new(session(&server.url()), Product::Hippo);
            ingest
                .upload_cloud(&source, ProcessingMode::Advanced, Some("hippo-folder"))
                .await
                .unwrap();

            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_get_job_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v0/job/req-7")
            .with_status(200)
            .with_body(r#"{"requestID": "req-7", "status": "processing", "progress": 40}"#)
            .create_async()
            .await;

        let ingest = Ingest::new(session(&server.url()), Product::Lexa);
        let job = ingest.get_job_status("req-7").await.unwrap();

        mock.assert_async().await;
        assert_eq!(job.request_id, "req-7");
        assert_eq!(job.progress, Some(40));
    }

    #[tokio::test]
    async fn test_get_job_status_empty_id() {
        let ingest = Ingest::new(session("http://127.0.0.1:1"), Product::Lexa);
        for id in ["", "   "] {
            let err = ingest.get_job_status(id).await.unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Validation { .. }));
        }
    }
}
