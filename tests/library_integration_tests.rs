mod common;

use glean_lab_client::client::{
    DataSourceConfig, Document, IndexingStatus, SearchRequest, StatusTarget,
};
use glean_lab_client::credentials::{
    CredentialKind, CredentialResolver, CredentialSource, EnvFileSource, Readiness, SecretStore,
};
use glean_lab_client::{ClientError, GleanClient};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{test_client, test_config, CLIENT_TOKEN, INDEX_TOKEN};

#[tokio::test]
async fn test_lab_walkthrough_search_index_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/v1/search"))
        .and(header("authorization", format!("Bearer {CLIENT_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "title": "Onboarding Guide",
                    "url": "https://x",
                    "snippets": [{"text": "Welcome aboard"}],
                    "document": {"id": "doc-1", "datasource": "labdocs"}
                }
            ],
            "hasMoreResults": true,
            "requestId": "req-42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/index/v1/bulkindexdocuments"))
        .and(header("authorization", format!("Bearer {INDEX_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acceptedCount": 1})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/index/v1/debug/labdocs/document"))
        .and(header("authorization", format!("Bearer {INDEX_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"uploadStatus": "UPLOADED", "indexingStatus": "NOT_INDEXED"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);

    let search = client
        .search(SearchRequest::new("onboarding guide").page_size(3))
        .await
        .unwrap();
    assert_eq!(search.results.len(), 1);
    assert_eq!(search.results[0].title, "Onboarding Guide");
    assert_eq!(search.results[0].datasource(), Some("labdocs"));
    assert_eq!(search.results[0].snippets[0].text, "Welcome aboard");
    assert!(search.has_more_results);
    assert_eq!(search.request_id.as_deref(), Some("req-42"));

    let datasource = DataSourceConfig::new("labdocs", "Article");
    let ack = client
        .bulk_index_documents(
            &datasource,
            &[Document::new("doc-1", "Onboarding Guide", "Welcome aboard", "https://x")],
        )
        .await
        .unwrap();
    assert_eq!(ack.accepted, 1);

    let status = client
        .check_status(&StatusTarget::Document {
            datasource,
            document_id: "doc-1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(status.status, IndexingStatus::Failed);
    assert!(status.status.is_terminal());
}

#[tokio::test]
async fn test_empty_search_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/v1/search"))
        .and(body_partial_json(json!({"query": "nothing matches", "pageSize": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .search_query("nothing matches")
        .await
        .unwrap();
    assert!(result.results.is_empty());
}

#[tokio::test]
async fn test_each_status_code_surfaces_verbatim() {
    for (status, body) in [(400, "bad query"), (401, "unauthorized"), (500, "boom")] {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/v1/search"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;

        match test_client(&server).search_query("q").await {
            Err(ClientError::Api {
                status: got_status,
                body: got_body,
            }) => {
                assert_eq!(got_status, status);
                assert_eq!(got_body, body);
            }
            other => panic!("expected Api error for {status}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_credentials_from_secret_store_and_env_file() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    let store_path = temp_dir.path().join("secrets.json");
    fs::write(&store_path, r#"{"GLEAN-CLIENT-API": "store-client"}"#).unwrap();
    let env_path = temp_dir.path().join(".env");
    fs::write(
        &env_path,
        "GLEAN_CLIENT_API=env-file-client\nGLEAN_INDEX_API=env-file-index\n",
    )
    .unwrap();

    let credentials = CredentialResolver::glean()
        .with_source(SecretStore::from_json_file(&store_path).unwrap())
        .with_source(EnvFileSource::from_paths(&[env_path]))
        .resolve();

    let client_cred = credentials.get(CredentialKind::Client).unwrap();
    assert_eq!(client_cred.source, Some(CredentialSource::SecretStore));
    let index_cred = credentials.get(CredentialKind::Indexing).unwrap();
    assert_eq!(index_cred.source, Some(CredentialSource::EnvFile));
    assert_eq!(credentials.status_report().readiness, Readiness::MixedSources);

    Mock::given(method("POST"))
        .and(path("/api/index/v1/debug/labdocs/status"))
        .and(header("authorization", "Bearer env-file-index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": {"bulkUploadHistory": [{"status": "SUCCESSFUL"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GleanClient::new(&test_config(&server), credentials).unwrap();
    let status = client
        .check_status(&StatusTarget::Datasource(DataSourceConfig::new(
            "labdocs", "Article",
        )))
        .await
        .unwrap();
    assert_eq!(status.status, IndexingStatus::Indexed);
}

#[tokio::test]
async fn test_placeholder_tokens_never_reach_the_network() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let env_path = temp_dir.path().join(".env");
    fs::write(
        &env_path,
        "GLEAN_CLIENT_API=your_client_token_here\nGLEAN_INDEX_API=your_indexing_token_here\n",
    )
    .unwrap();

    let credentials = CredentialResolver::glean()
        .with_source(EnvFileSource::from_paths(&[env_path]))
        .resolve();
    assert_eq!(credentials.status_report().readiness, Readiness::NoneLoaded);

    let client = GleanClient::new(&test_config(&server), credentials).unwrap();
    assert!(matches!(
        client.search_query("q").await,
        Err(ClientError::MissingCredential { .. })
    ));
    assert!(matches!(
        client
            .bulk_index_documents(
                &DataSourceConfig::new("labdocs", "Article"),
                &[Document::new("doc-1", "A", "a", "https://x")],
            )
            .await,
        Err(ClientError::MissingCredential { .. })
    ));
}
