use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderItem {
    pub folder_id: String,
    pub folder_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "currentSize")]
    pub current_size: Option<u64>,
    #[serde(default, rename = "historicalSize")]
    pub historical_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderCreatedResponse {
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub status: String,
    pub folder_id: String,
    pub folder_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FoldersListResponse {
    #[serde(default)]
    pub folders: Vec<FolderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileItem {
    pub file_id: String,
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<FileItem>,
}

/// Remote file for a folder upload. Without `filename` the server derives one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFile {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl UrlFile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: None,
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUploadResponse {
    #[serde(default)]
    pub uploaded: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub uploads: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatItem {
    pub chat_id: String,
    pub chat_name: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCreatedResponse {
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub status: String,
    pub chat_id: String,
    pub chat_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatsListResponse {
    #[serde(default)]
    pub chats: Vec<ChatItem>,
}

/// Passage of a folder document used to answer an ask.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceData {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskRequest {
    pub query: String,
    pub is_qna: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl AskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            is_qna: true,
            citation_style: None,
            sources: None,
        }
    }

    /// Only retrieve matching passages, without generating a reply.
    pub fn sources_only(mut self) -> Self {
        self.is_qna = false;
        self
    }

    /// Citation format of the reply, e.g. `APA`.
    pub fn citation_style(mut self, style: impl Into<String>) -> Self {
        self.citation_style = Some(style.into());
        self
    }

    /// Restricts retrieval to the given file ids.
    pub fn sources(mut self, file_ids: Vec<String>) -> Self {
        self.sources = Some(file_ids);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskSubmitResponse {
    pub ask_index: u64,
    pub query: String,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub source_data: Vec<SourceData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskListItem {
    pub ask_index: u64,
    #[serde(default)]
    pub ask_ts: Option<f64>,
    pub query: String,
    #[serde(default)]
    pub reply: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsksListResponse {
    #[serde(default)]
    pub ask_count: u64,
    #[serde(default)]
    pub asks: Vec<AskListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskItem {
    pub ask_index: u64,
    #[serde(default)]
    pub ask_ts: Option<f64>,
    pub query: String,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub filenames: Option<Vec<String>>,
    #[serde(default)]
    pub source_data: Option<Vec<SourceData>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FolderCreate<'a> {
    pub folder_id: &'a str,
    pub folder_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FolderUpdate<'a> {
    pub folder_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UrlFilesUpload<'a> {
    pub files: &'a [UrlFile],
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatCreate<'a> {
    pub folder_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatUpdate<'a> {
    pub chat_name: &'a str,
}
