use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use super::types::{ApiRequest, ApiResponse};
use crate::config::HttpConfig;
use crate::credentials::SecretValue;
use crate::error::{ClientError, Result};

/// Sends one authenticated request. Non-2xx statuses come back as
/// `ClientError::Api`; network failures as `ClientError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest, token: &SecretValue) -> Result<ApiResponse>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest, token: &SecretValue) -> Result<ApiResponse> {
        let url = request.url();
        debug!("{} {} ({})", request.method, url, request.operation);

        let response = self
            .client
            .request(request.method.clone(), &url)
            .json(&request.payload)
            .bearer_auth(token.expose())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("{} returned HTTP {status} ({} bytes)", request.operation, body.len());

        let response = ApiResponse::new(status, body);
        if !response.is_success() {
            return Err(ClientError::api(response.status, response.body));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::{ApiOperation, SearchRequest};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_request(base_url: &str) -> ApiRequest {
        ApiRequest::build(base_url, &ApiOperation::Search(SearchRequest::new("hello"))).unwrap()
    }

    fn fast_http() -> HttpConfig {
        HttpConfig {
            connect_timeout_secs: 2,
            timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn test_sends_bearer_token_and_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/v1/search"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_json(serde_json::json!({"query": "hello", "pageSize": 10})))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"results\":[]}"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&fast_http()).unwrap();
        let response = transport
            .execute(&search_request(&server.uri()), &SecretValue::new("tok-1"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.json, Some(serde_json::json!({"results": []})));
    }

    #[tokio::test]
    async fn test_non_success_keeps_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Not allowed"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&fast_http()).unwrap();
        let err = transport
            .execute(&search_request(&server.uri()), &SecretValue::new("tok"))
            .await
            .unwrap_err();

        match err {
            ClientError::Api { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Not allowed");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&HttpConfig {
            connect_timeout_secs: 1,
            timeout_secs: 1,
        })
        .unwrap();
        let err = transport
            .execute(&search_request(&server.uri()), &SecretValue::new("tok"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_relative_url_is_invalid_input_not_transport() {
        let transport = HttpTransport::new(&fast_http()).unwrap();
        let err = transport
            .execute(&search_request(""), &SecretValue::new("tok"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::new(&fast_http()).unwrap();
        let err = transport
            .execute(&search_request("http://127.0.0.1:1"), &SecretValue::new("tok"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
