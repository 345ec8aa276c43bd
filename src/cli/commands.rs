use log::{error, info};
use std::path::Path;

use super::args::CommonArgs;
use crate::client::{
    DataSourceConfig, Document, GleanClient, IndexSubmissionResult, SearchRequest, SearchResult,
    StatusResult, StatusTarget,
};
use crate::config::Config;
use crate::{ClientError, Result};

pub fn keys(args: &CommonArgs) -> Result<()> {
    let config = args.load_config()?;
    let credentials = args.resolve_credentials(&config)?;
    let report = credentials.status_report();

    println!("Instance: {} ({})", config.instance.name, config.base_url());
    println!("{report}");

    if !report.is_ready() {
        error!("Not all API keys are configured");
    }
    Ok(())
}

pub async fn search(
    args: &CommonArgs,
    query: String,
    page_size: u32,
    datasource: Option<String>,
) -> Result<()> {
    search_internal(args, query, page_size, datasource, true)
        .await
        .map(|_| ())
}

pub async fn search_internal(
    args: &CommonArgs,
    query: String,
    page_size: u32,
    datasource: Option<String>,
    output_to_console: bool,
) -> Result<SearchResult> {
    info!("Searching for: '{query}', page size: {page_size}");

    let config = args.load_config()?;
    let client = GleanClient::new(&config, args.resolve_credentials(&config)?)?;

    let mut request = SearchRequest::new(query.clone()).page_size(page_size);
    if let Some(datasource) = datasource {
        request = request.datasource(datasource);
    }

    let result = client.search(request).await?;

    if output_to_console {
        print_search_results(&query, &result);
    }
    Ok(result)
}

fn print_search_results(query: &str, result: &SearchResult) {
    if result.results.is_empty() {
        println!("No results found for query: '{query}'");
        return;
    }

    println!("\nSearch Results:");
    println!("==============");

    for (i, hit) in result.results.iter().enumerate() {
        println!("\n{num}. {title}", num = i + 1, title = hit.title);
        if !hit.url.is_empty() {
            println!("   URL: {}", hit.url);
        }
        if let Some(datasource) = hit.datasource() {
            println!("   Datasource: {datasource}");
        }
        if let Some(snippet) = hit.snippets.iter().find(|s| !s.text.is_empty()) {
            let preview = if snippet.text.chars().count() > 200 {
                format!("{}...", snippet.text.chars().take(200).collect::<String>())
            } else {
                snippet.text.clone()
            };
            println!("   Snippet: {}", preview.replace('\n', " "));
        }
    }

    if result.has_more_results {
        println!("\n(more results available)");
    }
}

pub async fn index(
    args: &CommonArgs,
    file: String,
    datasource: Option<String>,
    object_type: Option<String>,
) -> Result<()> {
    index_internal(args, file, datasource, object_type, true)
        .await
        .map(|_| ())
}

pub async fn index_internal(
    args: &CommonArgs,
    file: String,
    datasource: Option<String>,
    object_type: Option<String>,
    output_to_console: bool,
) -> Result<IndexSubmissionResult> {
    info!("Indexing documents from: {file}");

    let documents = read_documents(Path::new(&file))?;
    let config = args.load_config()?;
    let datasource = datasource_config(&config, datasource, object_type)?;

    if output_to_console {
        println!(
            "Uploading {len} documents to datasource '{name}'",
            len = documents.len(),
            name = datasource.name
        );
    }

    let client = GleanClient::new(&config, args.resolve_credentials(&config)?)?;
    let result = client.bulk_index_documents(&datasource, &documents).await?;

    if output_to_console {
        println!("Upload submitted!");
        println!("  Upload id: {}", result.upload_id);
        println!("  Documents submitted: {}", result.submitted);
        println!("  Documents accepted: {}", result.accepted);
        for rejection in &result.rejected {
            println!("  Rejected {}: {}", rejection.id, rejection.reason);
        }
    }
    Ok(result)
}

pub async fn status(
    args: &CommonArgs,
    datasource: Option<String>,
    document_id: Option<String>,
    object_type: Option<String>,
    format: String,
) -> Result<()> {
    status_internal(args, datasource, document_id, object_type, format, true)
        .await
        .map(|_| ())
}

pub async fn status_internal(
    args: &CommonArgs,
    datasource: Option<String>,
    document_id: Option<String>,
    object_type: Option<String>,
    format: String,
    output_to_console: bool,
) -> Result<StatusResult> {
    if format != "text" && format != "json" {
        return Err(ClientError::invalid_input(format!(
            "Unknown output format: {format} (expected text or json)"
        )));
    }

    let config = args.load_config()?;
    let datasource = datasource_config(&config, datasource, object_type)?;
    let target = match document_id {
        Some(document_id) => StatusTarget::Document {
            datasource,
            document_id,
        },
        None => StatusTarget::Datasource(datasource),
    };
    info!("Checking status of {target:?}");

    let client = GleanClient::new(&config, args.resolve_credentials(&config)?)?;
    let result = client.check_status(&target).await?;

    if output_to_console {
        if format == "json" {
            println!("{}", serde_json::to_string_pretty(&result.raw)?);
        } else {
            match &target {
                StatusTarget::Document { document_id, .. } => {
                    println!("Document {document_id}: {}", result.status)
                }
                StatusTarget::Datasource(ds) => println!("Datasource {}: {}", ds.name, result.status),
            }
        }
    }
    Ok(result)
}

/// Datasource from the flag, falling back to `indexing.datasource`.
fn datasource_config(
    config: &Config,
    datasource: Option<String>,
    object_type: Option<String>,
) -> Result<DataSourceConfig> {
    let name = datasource
        .or_else(|| config.indexing.datasource.clone())
        .ok_or_else(|| {
            ClientError::invalid_input("No datasource given (use --datasource or GLEAN_DATASOURCE)")
        })?;
    let object_type = object_type.unwrap_or_else(|| config.indexing.object_type.clone());
    Ok(DataSourceConfig::new(name, object_type))
}

/// Reads a JSON array of documents.
pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    if !path.is_file() {
        return Err(ClientError::invalid_input(format!(
            "Document file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let documents: Vec<Document> = serde_json::from_str(&content).map_err(|e| {
        ClientError::invalid_input(format!(
            "{} must be a JSON array of documents: {e}",
            path.display()
        ))
    })?;
    Ok(documents)
}
