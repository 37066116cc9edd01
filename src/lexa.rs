//! Lexa document parsing: submit, wait, return the completed job.

use log::info;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::Session;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::ApiRequest;
use crate::ingest::{CloudSource, FileInput, Ingest, JobPoller, ProgressCallback};
use crate::models::{
    BucketListResponse, DriveListResponse, FolderListResponse, IngestionResult, JobResponse,
    ProcessingMode, Product, SiteListResponse,
};
use crate::runtime::{RealRuntime, Runtime};

/// Options for the `parse*` family. Unset durations fall back to the session config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: ProcessingMode,
    pub timeout: Option<Duration>,
    pub poll_interval: Option<Duration>,
}

impl ParseOptions {
    pub fn mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = Some(poll_interval);
        self
    }
}

pub struct Lexa<R: Runtime = RealRuntime> {
    session: Arc<Session>,
    ingest: Ingest<R>,
}

impl Lexa<RealRuntime> {
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_runtime(session, RealRuntime)
    }

    pub async fn connect(config: Config) -> Result<Self> {
        Ok(Self::new(Session::connect(config).await?))
    }
}

impl<R: Runtime> Lexa<R> {
    pub fn with_runtime(session: Arc<Session>, runtime: R) -> Self {
        let ingest = Ingest::with_runtime(session.clone(), Product::Lexa, runtime);
        Self { session, ingest }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn ingest(&self) -> &Ingest<R> {
        &self.ingest
    }

    pub async fn get_job_status(&self, request_id: &str) -> Result<JobResponse> {
        self.ingest.get_job_status(request_id).await
    }

    /// Polls a job until it finishes. `timeout` defaults to the configured
    /// `max_poll_time`, `poll_interval` to the configured interval.
    pub async fn wait_for_completion(
        &self,
        request_id: &str,
        timeout: Option<Duration>,
        poll_interval: Option<Duration>,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let config = self.session.config();
        let poller = JobPoller::new(
            timeout.unwrap_or(config.max_poll_time()),
            poll_interval.unwrap_or(config.poll_interval()),
        );
        poller.wait(&self.ingest, request_id, progress).await
    }

    /// Uploads files and waits for them to be parsed.
    #[tracing::instrument(skip(self, files, progress))]
    pub async fn parse(
        &self,
        files: Vec<FileInput>,
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let upload = self.ingest.upload_files(files, options.mode, None).await?;
        self.complete(upload, options, progress).await
    }

    /// Submits URLs and waits for them to be parsed.
    #[tracing::instrument(skip(self, urls, progress))]
    pub async fn parse_urls(
        &self,
        urls: &[String],
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let upload = self.ingest.upload_urls(urls, options.mode, None).await?;
        self.complete(upload, options, progress).await
    }

    /// Ingests a cloud storage folder and waits for it to be parsed.
    #[tracing::instrument(skip(self, progress))]
    pub async fn parse_cloud(
        &self,
        source: &CloudSource,
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let upload = self.ingest.upload_cloud(source, options.mode, None).await?;
        self.complete(upload, options, progress).await
    }

    pub async fn parse_s3_folder(
        &self,
        bucket: &str,
        path: &str,
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let source = CloudSource::S3 {
            bucket: bucket.to_string(),
            path: path.to_string(),
        };
        self.parse_cloud(&source, options, progress).await
    }

    pub async fn parse_box_folder(
        &self,
        box_folder_id: &str,
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let source = CloudSource::Box {
            folder_id: box_folder_id.to_string(),
        };
        self.parse_cloud(&source, options, progress).await
    }

    pub async fn parse_dropbox_folder(
        &self,
        path: &str,
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let source = CloudSource::Dropbox {
            path: path.to_string(),
        };
        self.parse_cloud(&source, options, progress).await
    }

    pub async fn parse_sharepoint_folder(
        &self,
        drive_id: &str,
        folder_id: &str,
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let source = CloudSource::SharePoint {
            drive_id: drive_id.to_string(),
            folder_id: folder_id.to_string(),
        };
        self.parse_cloud(&source, options, progress).await
    }

    pub async fn parse_salesforce_folder(
        &self,
        name: &str,
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let source = CloudSource::Salesforce {
            name: name.to_string(),
        };
        self.parse_cloud(&source, options, progress).await
    }

    pub async fn parse_sendme_files(
        &self,
        ticket: &str,
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        let source = CloudSource::Sendme {
            ticket: ticket.to_string(),
        };
        self.parse_cloud(&source, options, progress).await
    }

    async fn complete(
        &self,
        upload: IngestionResult,
        options: ParseOptions,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        if upload.request_id.trim().is_empty() {
            return Err(Error::other("Failed to get request ID from upload"));
        }
        info!("Waiting for job {}...", upload.request_id);
        self.wait_for_completion(
            &upload.request_id,
            options.timeout,
            options.poll_interval,
            progress,
        )
        .await
    }

    // Cloud storage discovery

    pub async fn list_s3_buckets(&self) -> Result<BucketListResponse> {
        self.list("/v0/amazon-listBuckets", None).await
    }

    pub async fn list_s3_folders(&self, bucket: &str) -> Result<FolderListResponse> {
        self.list("/v0/amazon-listFoldersInBucket", Some(("bucket", bucket)))
            .await
    }

    pub async fn list_box_folders(&self) -> Result<FolderListResponse> {
        self.list("/v0/box-listFolders", None).await
    }

    pub async fn list_dropbox_folders(&self) -> Result<FolderListResponse> {
        self.list("/v0/dropbox-listFolders", None).await
    }

    pub async fn list_sharepoint_sites(&self) -> Result<SiteListResponse> {
        self.list("/v0/microsoft-listSites", None).await
    }

    pub async fn list_sharepoint_drives(&self, site_id: &str) -> Result<DriveListResponse> {
        self.list("/v0/microsoft-listDrivesInSite", Some(("site_id", site_id)))
            .await
    }

    pub async fn list_sharepoint_folders(&self, drive_id: &str) -> Result<FolderListResponse> {
        self.list("/v0/microsoft-listFoldersInDrive", Some(("drive_id", drive_id)))
            .await
    }

    pub async fn list_salesforce_folders(&self) -> Result<FolderListResponse> {
        self.list("/v0/salesforce-listFolders", None).await
    }

    #[tracing::instrument(skip(self))]
    async fn list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        param: Option<(&str, &str)>,
    ) -> Result<T> {
        let mut request = ApiRequest::get(self.session.data_url(path));
        if let Some((key, value)) = param {
            request = request.query(key, value);
        }
        self.session.request_as(request).await
    }
}
