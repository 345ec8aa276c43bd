use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::credentials::{CredentialResolver, OverrideSource, ResolvedCredentials};
use crate::Result;

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Glean instance name (the `<instance>` in https://<instance>-be.glean.com)
    #[arg(long, global = true)]
    pub instance: Option<String>,

    /// Client API token; takes priority over every other source
    #[arg(long, global = true)]
    pub client_token: Option<String>,

    /// Indexing API token; takes priority over every other source
    #[arg(long, global = true)]
    pub index_token: Option<String>,

    /// JSON secret store file (`{"GLEAN-CLIENT-API": "..."}`)
    #[arg(long, global = true)]
    pub secrets_file: Option<PathBuf>,
}

impl CommonArgs {
    /// Config file and environment, then command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(Some(path))?,
            None => Config::load()?,
        };

        if let Some(instance) = &self.instance {
            config.instance.name = instance.clone();
        }
        if let Some(path) = &self.secrets_file {
            config.secrets.secret_store = Some(path.clone());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn resolve_credentials(&self, config: &Config) -> Result<ResolvedCredentials> {
        let overrides = OverrideSource::new()
            .set_optional("GLEAN_CLIENT_API", self.client_token.clone())
            .set_optional("GLEAN_INDEX_API", self.index_token.clone());

        Ok(CredentialResolver::glean()
            .with_source(overrides)
            .with_configured_sources(&config.secrets)?
            .resolve())
    }
}
