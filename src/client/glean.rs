use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use uuid::Uuid;

use super::transport::{HttpTransport, Transport};
use super::types::{
    ApiOperation, ApiRequest, ApiResponse, BulkIndexRequest, BulkIndexResponse, DataSourceConfig,
    DebugDocumentRequest, Document, IndexSubmissionResult, SearchRequest, SearchResult,
    StatusResult, StatusTarget,
};
use crate::config::Config;
use crate::credentials::ResolvedCredentials;
use crate::error::{ClientError, Result};

/// Client for the Search and Indexing APIs of one Glean instance.
///
/// Holds only the base URL, the credentials resolved at construction, and
/// the transport. Every call is a single request with no retries.
pub struct GleanClient {
    base_url: String,
    credentials: ResolvedCredentials,
    transport: Box<dyn Transport>,
}

impl GleanClient {
    pub fn new(config: &Config, credentials: ResolvedCredentials) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.http)?;
        Ok(Self::with_transport(
            config.base_url(),
            credentials,
            Box::new(transport),
        ))
    }

    pub fn with_transport(
        base_url: String,
        credentials: ResolvedCredentials,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            transport,
        }
    }

    pub async fn search_query(&self, query: &str) -> Result<SearchResult> {
        self.search(SearchRequest::new(query)).await
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResult> {
        if request.query.trim().is_empty() {
            return Err(ClientError::invalid_input("Search query cannot be empty"));
        }

        info!("Searching for: '{}'", request.query);
        let response = self.send(&ApiOperation::Search(request)).await?;
        let result: SearchResult = parse_json(&response, "search")?;
        debug!("Search returned {} results", result.results.len());
        Ok(result)
    }

    /// Uploads `documents` as a single-page bulk upload under a fresh
    /// upload id. Whether a repeated upload appends or replaces is up to
    /// the service; pick unique document ids.
    pub async fn bulk_index_documents(
        &self,
        datasource: &DataSourceConfig,
        documents: &[Document],
    ) -> Result<IndexSubmissionResult> {
        validate_datasource(datasource)?;
        validate_documents(documents)?;

        let upload_id = Uuid::new_v4().to_string();
        info!(
            "Uploading {} documents to datasource '{}' (upload {upload_id})",
            documents.len(),
            datasource.name
        );

        let request = BulkIndexRequest {
            upload_id: upload_id.clone(),
            is_first_page: true,
            is_last_page: true,
            force_restart_upload: false,
            datasource: datasource.name.clone(),
            documents: documents.iter().map(|d| d.to_wire(datasource)).collect(),
        };

        let response = self
            .send(&ApiOperation::BulkIndexDocuments(request))
            .await?;

        let ack: BulkIndexResponse = if response.body.trim().is_empty() {
            BulkIndexResponse::default()
        } else {
            parse_json(&response, "bulk index")?
        };

        let submitted = documents.len();
        let accepted = ack
            .accepted_count
            .unwrap_or_else(|| submitted.saturating_sub(ack.rejected_documents.len()));

        for rejection in &ack.rejected_documents {
            warn!("Document '{}' rejected: {}", rejection.id, rejection.reason);
        }

        Ok(IndexSubmissionResult {
            upload_id,
            submitted,
            accepted,
            rejected: ack.rejected_documents,
        })
    }

    pub async fn check_status(&self, target: &StatusTarget) -> Result<StatusResult> {
        let result = match target {
            StatusTarget::Document {
                datasource,
                document_id,
            } => {
                validate_datasource(datasource)?;
                if document_id.trim().is_empty() {
                    return Err(ClientError::invalid_input("Document id cannot be empty"));
                }

                let operation = ApiOperation::DebugDocument {
                    datasource: datasource.name.clone(),
                    body: DebugDocumentRequest {
                        object_type: datasource.object_type.clone(),
                        doc_id: document_id.clone(),
                    },
                };
                let response = self.send(&operation).await?;
                StatusResult::from_document_debug(parse_json(&response, "document status")?)
            }
            StatusTarget::Datasource(datasource) => {
                validate_datasource(datasource)?;

                let operation = ApiOperation::DebugDatasource {
                    datasource: datasource.name.clone(),
                };
                let response = self.send(&operation).await?;
                StatusResult::from_datasource_debug(parse_json(&response, "datasource status")?)
            }
        };

        info!("Status: {}", result.status);
        Ok(result)
    }

    /// The credential check happens here, before any I/O.
    async fn send(&self, operation: &ApiOperation) -> Result<ApiResponse> {
        let request = ApiRequest::build(&self.base_url, operation)?;
        let token = self.credentials.require(request.required_credential)?;
        self.transport.execute(&request, token).await
    }
}

fn parse_json<T: DeserializeOwned>(response: &ApiResponse, what: &str) -> Result<T> {
    let value = response.json.clone().ok_or_else(|| {
        ClientError::malformed_response(format!(
            "{what} response is not JSON: {}",
            preview(&response.body)
        ))
    })?;

    serde_json::from_value(value)
        .map_err(|e| ClientError::malformed_response(format!("unexpected {what} response shape: {e}")))
}

fn preview(body: &str) -> String {
    if body.chars().count() > 200 {
        let head: String = body.chars().take(200).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

fn validate_datasource(datasource: &DataSourceConfig) -> Result<()> {
    let name = datasource.name.as_str();
    if name.trim().is_empty() {
        return Err(ClientError::invalid_input("Datasource name cannot be empty"));
    }
    // Used verbatim as a URL path segment.
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ClientError::invalid_input(format!(
            "Datasource name may only contain letters, digits, '-' and '_': {name}"
        )));
    }
    Ok(())
}

fn validate_documents(documents: &[Document]) -> Result<()> {
    if documents.is_empty() {
        return Err(ClientError::invalid_input(
            "At least one document is required",
        ));
    }

    let mut seen = HashSet::new();
    for document in documents {
        if document.id.trim().is_empty() {
            return Err(ClientError::invalid_input(format!(
                "Document '{}' has an empty id",
                document.title
            )));
        }
        if !seen.insert(document.id.as_str()) {
            return Err(ClientError::invalid_input(format!(
                "Duplicate document id: {}",
                document.id
            )));
        }
    }
    Ok(())
}
