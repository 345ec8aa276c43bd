#![allow(dead_code)]

use glean_lab_client::config::Config;
use glean_lab_client::credentials::{CredentialResolver, OverrideSource, ResolvedCredentials};
use glean_lab_client::GleanClient;
use wiremock::MockServer;

pub const CLIENT_TOKEN: &str = "test-client-token";
pub const INDEX_TOKEN: &str = "test-index-token";

pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.instance.base_url = Some(server.uri());
    config.http.connect_timeout_secs = 2;
    config.http.timeout_secs = 5;
    config.indexing.datasource = Some("labdocs".to_string());
    config
}

pub fn both_tokens() -> ResolvedCredentials {
    CredentialResolver::glean()
        .with_source(
            OverrideSource::new()
                .with("GLEAN_CLIENT_API", CLIENT_TOKEN)
                .with("GLEAN_INDEX_API", INDEX_TOKEN),
        )
        .resolve()
}

pub fn test_client(server: &MockServer) -> GleanClient {
    GleanClient::new(&test_config(server), both_tokens()).unwrap()
}
