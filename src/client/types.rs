use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::credentials::CredentialKind;

pub const SEARCH_PATH: &str = "/rest/api/v1/search";
pub const BULK_INDEX_PATH: &str = "/api/index/v1/bulkindexdocuments";

// Search

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_options: Option<SearchRequestOptions>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource_filter: Option<String>,
    pub facet_bucket_size: u32,
}

impl SearchRequest {
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
            page_size: 10,
            request_options: None,
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Restricts results to one datasource.
    pub fn datasource<S: Into<String>>(mut self, datasource: S) -> Self {
        self.request_options = Some(SearchRequestOptions {
            datasource_filter: Some(datasource.into()),
            facet_bucket_size: 10,
        });
        self
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub has_more_results: bool,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippets: Vec<Snippet>,
    pub document: Option<HitDocument>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Snippet {
    #[serde(default, alias = "snippet")]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HitDocument {
    pub id: Option<String>,
    pub datasource: Option<String>,
    pub doc_type: Option<String>,
}

impl SearchHit {
    pub fn datasource(&self) -> Option<&str> {
        self.document.as_ref()?.datasource.as_deref()
    }
}

pub type SearchResult = SearchResponse;

// Indexing

/// The custom datasource documents are attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceConfig {
    pub name: String,
    pub object_type: String,
}

impl DataSourceConfig {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, object_type: T) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
        }
    }
}

/// Caller-facing document; becomes a [`WireDocument`] on upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(alias = "viewURL", alias = "view_url")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl Document {
    pub fn new(id: &str, title: &str, body: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            url: url.to_string(),
            object_type: None,
            mime_type: None,
            author: None,
            updated_at: None,
            created_at: None,
        }
    }

    pub fn to_wire(&self, datasource: &DataSourceConfig) -> WireDocument {
        WireDocument {
            datasource: datasource.name.clone(),
            object_type: self
                .object_type
                .clone()
                .unwrap_or_else(|| datasource.object_type.clone()),
            id: self.id.clone(),
            title: self.title.clone(),
            view_url: self.url.clone(),
            body: WireBody {
                mime_type: self
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| "text/plain".to_string()),
                text_content: self.body.clone(),
            },
            author: self.author.clone().map(|name| WireAuthor { name }),
            updated_at: self.updated_at,
            created_at: self.created_at,
            permissions: WirePermissions {
                allow_anonymous_access: true,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    pub datasource: String,
    pub object_type: String,
    pub id: String,
    pub title: String,
    #[serde(rename = "viewURL")]
    pub view_url: String,
    pub body: WireBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<WireAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    pub permissions: WirePermissions,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireBody {
    pub mime_type: String,
    pub text_content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WireAuthor {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WirePermissions {
    pub allow_anonymous_access: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkIndexRequest {
    pub upload_id: String,
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub force_restart_upload: bool,
    pub datasource: String,
    pub documents: Vec<WireDocument>,
}

/// Optional acknowledgement body; the service may answer with an empty 200.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkIndexResponse {
    #[serde(alias = "numAccepted")]
    pub accepted_count: Option<usize>,
    #[serde(default)]
    pub rejected_documents: Vec<DocumentRejection>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DocumentRejection {
    #[serde(alias = "docId")]
    pub id: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSubmissionResult {
    pub upload_id: String,
    pub submitted: usize,
    pub accepted: usize,
    pub rejected: Vec<DocumentRejection>,
}

// Status

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTarget {
    Document {
        datasource: DataSourceConfig,
        document_id: String,
    },
    Datasource(DataSourceConfig),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebugDocumentRequest {
    pub object_type: String,
    pub doc_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexingStatus {
    Pending,
    Indexed,
    Failed,
    Unknown(String),
}

impl IndexingStatus {
    /// Maps the service's status strings, case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "INDEXED" | "SUCCESSFUL" | "SUCCESS" | "COMPLETED" => Self::Indexed,
            "NOT_INDEXED" | "FAILED" | "FAILURE" | "ERROR" | "REJECTED" => Self::Failed,
            "PENDING" | "UPLOADED" | "NOT_UPLOADED" | "IN_PROGRESS" | "ACTIVE" | "QUEUED" => {
                Self::Pending
            }
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Indexed | Self::Failed)
    }
}

impl fmt::Display for IndexingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Indexed => write!(f, "indexed"),
            Self::Failed => write!(f, "failed"),
            Self::Unknown(raw) => write!(f, "unknown ({raw})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusResult {
    pub status: IndexingStatus,
    pub raw: Value,
}

impl StatusResult {
    /// Reads `status.indexingStatus`, falling back to `status.uploadStatus`.
    pub fn from_document_debug(raw: Value) -> Self {
        let status = ["indexingStatus", "uploadStatus"]
            .iter()
            .find_map(|key| raw.pointer(&format!("/status/{key}"))?.as_str())
            .map(IndexingStatus::parse)
            .unwrap_or_else(|| IndexingStatus::Unknown("missing status".to_string()));
        Self { status, raw }
    }

    /// Reads the latest processing or bulk upload history entry. Upload
    /// history is either nested under its own key or a flat array.
    pub fn from_datasource_debug(raw: Value) -> Self {
        let status = [
            "/documents/processingHistory",
            "/documents/bulkUploadHistory/bulkUploadHistory",
            "/documents/bulkUploadHistory",
        ]
        .iter()
        .find_map(|pointer| {
            let latest = raw.pointer(pointer)?.as_array()?.last()?;
            latest
                .get("processingState")
                .or_else(|| latest.get("status"))?
                .as_str()
        })
        .map(IndexingStatus::parse)
        .unwrap_or_else(|| IndexingStatus::Unknown("no history".to_string()));
        Self { status, raw }
    }
}

// Requests on the wire

/// One logical operation with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOperation {
    Search(SearchRequest),
    BulkIndexDocuments(BulkIndexRequest),
    DebugDocument {
        datasource: String,
        body: DebugDocumentRequest,
    },
    DebugDatasource {
        datasource: String,
    },
}

impl ApiOperation {
    pub fn required_credential(&self) -> CredentialKind {
        match self {
            Self::Search(_) => CredentialKind::Client,
            Self::BulkIndexDocuments(_) | Self::DebugDocument { .. } | Self::DebugDatasource { .. } => {
                CredentialKind::Indexing
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Search(_) => SEARCH_PATH.to_string(),
            Self::BulkIndexDocuments(_) => BULK_INDEX_PATH.to_string(),
            Self::DebugDocument { datasource, .. } => {
                format!("/api/index/v1/debug/{datasource}/document")
            }
            Self::DebugDatasource { datasource } => {
                format!("/api/index/v1/debug/{datasource}/status")
            }
        }
    }

    pub fn method(&self) -> Method {
        Method::POST
    }

    pub fn payload(&self) -> serde_json::Result<Value> {
        match self {
            Self::Search(request) => serde_json::to_value(request),
            Self::BulkIndexDocuments(request) => serde_json::to_value(request),
            Self::DebugDocument { body, .. } => serde_json::to_value(body),
            Self::DebugDatasource { .. } => Ok(Value::Object(Default::default())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::BulkIndexDocuments(_) => "bulk_index_documents",
            Self::DebugDocument { .. } => "debug_document",
            Self::DebugDatasource { .. } => "debug_datasource",
        }
    }
}

/// A fully addressed request, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub operation: &'static str,
    pub base_url: String,
    pub path: String,
    pub method: Method,
    pub payload: Value,
    pub required_credential: CredentialKind,
}

impl ApiRequest {
    pub fn build(base_url: &str, operation: &ApiOperation) -> serde_json::Result<Self> {
        Ok(Self {
            operation: operation.name(),
            base_url: base_url.to_string(),
            path: operation.path(),
            method: operation.method(),
            payload: operation.payload()?,
            required_credential: operation.required_credential(),
        })
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    pub json: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: String) -> Self {
        let json = if body.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&body).ok()
        };
        Self { status, body, json }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
