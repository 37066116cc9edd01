//! Hippo RAG chat: folders, folder files, chats and asks.
//!
//! Single files and URL lists are uploaded straight into a folder. Batch and
//! cloud-storage uploads go through the shared [`Ingest`] service with
//! `product=hippo` and the folder id attached.

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::Session;
use crate::config::Config;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::ingest::{CloudSource, FileInput, Ingest};
use crate::models::{
    AskItem, AskListItem, AskRequest, AskSubmitResponse, AsksListResponse, ChatCreate,
    ChatCreatedResponse, ChatItem, ChatUpdate, ChatsListResponse, DeletedResponse, FileItem,
    FileUploadResponse, FilesListResponse, FolderCreate, FolderCreatedResponse, FolderItem,
    FolderUpdate, FoldersListResponse, IngestionResult, ProcessingMode, Product,
    UpdatedResponse, UrlFile, UrlFilesUpload,
};
use crate::runtime::{RealRuntime, Runtime};

/// Default reply/query truncation used when listing asks.
pub const DEFAULT_MSG_MAXLEN: u32 = 120;

pub struct Hippo<R: Runtime = RealRuntime> {
    session: Arc<Session>,
    ingest: Ingest<R>,
}

impl Hippo<RealRuntime> {
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_runtime(session, RealRuntime)
    }

    pub async fn connect(config: Config) -> Result<Self> {
        Ok(Self::new(Session::connect(config).await?))
    }
}

impl<R: Runtime> Hippo<R> {
    pub fn with_runtime(session: Arc<Session>, runtime: R) -> Self {
        let ingest = Ingest::with_runtime(session.clone(), Product::Hippo, runtime);
        Self { session, ingest }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Ingestion service, e.g. to check the status of an upload.
    pub fn ingest(&self) -> &Ingest<R> {
        &self.ingest
    }

    // Folders

    #[tracing::instrument(skip(self))]
    pub async fn create_folder(
        &self,
        folder_id: &str,
        folder_name: &str,
    ) -> Result<FolderCreatedResponse> {
        let request = ApiRequest::post(self.session.base_url("/folders")).json(&FolderCreate {
            folder_id,
            folder_name,
        })?;
        self.session.request_as(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_folders(&self, search_name: Option<&str>) -> Result<Vec<FolderItem>> {
        let request = ApiRequest::get(self.session.base_url("/folders"))
            .query_opt("search_name", search_name);
        let response: FoldersListResponse = self.session.request_as(request).await?;
        Ok(response.folders)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_folder_by_id(&self, folder_id: &str) -> Result<FolderItem> {
        self.get(&format!("/folders/{}", folder_id)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_folder(
        &self,
        folder_id: &str,
        folder_name: &str,
    ) -> Result<UpdatedResponse> {
        let request = ApiRequest::put(self.session.base_url(&format!("/folders/{}", folder_id)))
            .json(&FolderUpdate { folder_name })?;
        self.session.request_as(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_folder(&self, folder_id: &str) -> Result<DeletedResponse> {
        self.delete(&format!("/folders/{}", folder_id)).await
    }

    // Files

    /// `POST /folders/{id}/files` with the content as multipart field `file`.
    #[tracing::instrument(skip(self, file))]
    pub async fn upload_file(
        &self,
        folder_id: &str,
        file: impl Into<FileInput>,
    ) -> Result<FileUploadResponse> {
        let part = self.ingest.file_part("file", 0, file.into())?;
        let url = self.session.base_url(&format!("/folders/{}/files", folder_id));
        let request = ApiRequest::post(url).multipart(vec![part]);
        self.session.request_as(request).await
    }

    /// `POST /folders/{id}/files/url`.
    #[tracing::instrument(skip(self, files))]
    pub async fn upload_file_from_url(
        &self,
        folder_id: &str,
        files: &[UrlFile],
    ) -> Result<FileUploadResponse> {
        let url = self.session.base_url(&format!("/folders/{}/files/url", folder_id));
        let request = ApiRequest::post(url).json(&UrlFilesUpload { files })?;
        self.session.request_as(request).await
    }

    /// Batch upload through the data API; returns the ingestion request id.
    pub async fn upload_files(
        &self,
        folder_id: &str,
        files: Vec<FileInput>,
        mode: ProcessingMode,
    ) -> Result<IngestionResult> {
        self.ingest.upload_files(files, mode, Some(folder_id)).await
    }

    /// Ingests remote files into the folder through the data API.
    pub async fn upload_urls(
        &self,
        folder_id: &str,
        urls: &[String],
        mode: ProcessingMode,
    ) -> Result<IngestionResult> {
        self.ingest.upload_urls(urls, mode, Some(folder_id)).await
    }

    pub async fn upload_cloud_folder(
        &self,
        folder_id: &str,
        source: &CloudSource,
        mode: ProcessingMode,
    ) -> Result<IngestionResult> {
        self.ingest.upload_cloud(source, mode, Some(folder_id)).await
    }

    pub async fn upload_s3_folder(
        &self,
        folder_id: &str,
        bucket: &str,
        path: &str,
        mode: ProcessingMode,
    ) -> Result<IngestionResult> {
        let source = CloudSource::S3 {
            bucket: bucket.to_string(),
            path: path.to_string(),
        };
        self.upload_cloud_folder(folder_id, &source, mode).await
    }

    pub async fn upload_box_folder(
        &self,
        folder_id: &str,
        box_folder_id: &str,
        mode: ProcessingMode,
    ) -> Result<IngestionResult> {
        let source = CloudSource::Box {
            folder_id: box_folder_id.to_string(),
        };
        self.upload_cloud_folder(folder_id, &source, mode).await
    }

    pub async fn upload_dropbox_folder(
        &self,
        folder_id: &str,
        path: &str,
        mode: ProcessingMode,
    ) -> Result<IngestionResult> {
        let source = CloudSource::Dropbox {
            path: path.to_string(),
        };
        self.upload_cloud_folder(folder_id, &source, mode).await
    }

    pub async fn upload_sharepoint_folder(
        &self,
        folder_id: &str,
        drive_id: &str,
        sharepoint_folder_id: &str,
        mode: ProcessingMode,
    ) -> Result<IngestionResult> {
        let source = CloudSource::SharePoint {
            drive_id: drive_id.to_string(),
            folder_id: sharepoint_folder_id.to_string(),
        };
        self.upload_cloud_folder(folder_id, &source, mode).await
    }

    pub async fn upload_salesforce_folder(
        &self,
        folder_id: &str,
        name: &str,
        mode: ProcessingMode,
    ) -> Result<IngestionResult> {
        let source = CloudSource::Salesforce {
            name: name.to_string(),
        };
        self.upload_cloud_folder(folder_id, &source, mode).await
    }

    pub async fn upload_sendme_files(
        &self,
        folder_id: &str,
        ticket: &str,
        mode: ProcessingMode,
    ) -> Result<IngestionResult> {
        let source = CloudSource::Sendme {
            ticket: ticket.to_string(),
        };
        self.upload_cloud_folder(folder_id, &source, mode).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_files(
        &self,
        folder_id: &str,
        search_name: Option<&str>,
    ) -> Result<Vec<FileItem>> {
        let url = self.session.base_url(&format!("/folders/{}/files", folder_id));
        let request = ApiRequest::get(url).query_opt("search_name", search_name);
        let response: FilesListResponse = self.session.request_as(request).await?;
        Ok(response.files)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_file_by_id(&self, folder_id: &str, file_id: &str) -> Result<FileItem> {
        self.get(&format!("/folders/{}/files/{}", folder_id, file_id)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_file_by_id(
        &self,
        folder_id: &str,
        file_id: &str,
    ) -> Result<DeletedResponse> {
        self.delete(&format!("/folders/{}/files/{}", folder_id, file_id)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_all_files(&self, folder_id: &str) -> Result<DeletedResponse> {
        self.delete(&format!("/folders/{}/files", folder_id)).await
    }

    pub async fn get_folder_file_count(&self, folder_id: &str) -> Result<usize> {
        Ok(self.get_files(folder_id, None).await?.len())
    }

    // Chats

    #[tracing::instrument(skip(self))]
    pub async fn create_chat(&self, folder_id: &str) -> Result<ChatCreatedResponse> {
        let request =
            ApiRequest::post(self.session.base_url("/chats")).json(&ChatCreate { folder_id })?;
        self.session.request_as(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_chats(&self, folder_id: Option<&str>) -> Result<Vec<ChatItem>> {
        let request =
            ApiRequest::get(self.session.base_url("/chats")).query_opt("folder_id", folder_id);
        let response: ChatsListResponse = self.session.request_as(request).await?;
        Ok(response.chats)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_chat_by_id(&self, chat_id: &str) -> Result<ChatItem> {
        self.get(&format!("/chats/{}", chat_id)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_chat(&self, chat_id: &str, chat_name: &str) -> Result<UpdatedResponse> {
        let request = ApiRequest::put(self.session.base_url(&format!("/chats/{}", chat_id)))
            .json(&ChatUpdate { chat_name })?;
        self.session.request_as(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_chat(&self, chat_id: &str) -> Result<DeletedResponse> {
        self.delete(&format!("/chats/{}", chat_id)).await
    }

    // Asks

    #[tracing::instrument(skip(self, ask))]
    pub async fn submit_ask(&self, chat_id: &str, ask: &AskRequest) -> Result<AskSubmitResponse> {
        let url = self.session.base_url(&format!("/chats/{}/asks", chat_id));
        let request = ApiRequest::post(url).json(ask)?;
        self.session.request_as(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_asks(&self, chat_id: &str, msg_maxlen: u32) -> Result<Vec<AskListItem>> {
        Ok(self.list_asks(chat_id, msg_maxlen).await?.asks)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_ask_by_index(
        &self,
        chat_id: &str,
        ask_index: u64,
        show_files: bool,
        show_source: bool,
    ) -> Result<AskItem> {
        let url = self
            .session
            .base_url(&format!("/chats/{}/asks/{}", chat_id, ask_index));
        let request = ApiRequest::get(url)
            .query_opt("show_files", show_files.then_some("true"))
            .query_opt("show_source", show_source.then_some("true"));
        self.session.request_as(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_ask_by_index(
        &self,
        chat_id: &str,
        ask_index: u64,
    ) -> Result<DeletedResponse> {
        self.delete(&format!("/chats/{}/asks/{}", chat_id, ask_index)).await
    }

    pub async fn get_chat_ask_count(&self, chat_id: &str) -> Result<u64> {
        Ok(self.list_asks(chat_id, DEFAULT_MSG_MAXLEN).await?.ask_count)
    }

    async fn list_asks(&self, chat_id: &str, msg_maxlen: u32) -> Result<AsksListResponse> {
        let url = self.session.base_url(&format!("/chats/{}/asks", chat_id));
        let request = ApiRequest::get(url).query("msg_maxlen", msg_maxlen);
        self.session.request_as(request).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.session
            .request_as(ApiRequest::get(self.session.base_url(path)))
            .await
    }

    async fn delete(&self, path: &str) -> Result<DeletedResponse> {
        self.session
            .request_as(ApiRequest::delete(self.session.base_url(path)))
            .await
    }
}
