use log::{info, warn};
use std::fmt;

use super::sources::{
    is_valid_key, CredentialKind, CredentialSource, EnvFileSource, EnvVarSource, SecretSource,
    SecretSpec, SecretStore, SecretValue,
};
use crate::config::SecretsConfig;
use crate::error::{ClientError, Result};

/// Outcome of resolving one recognized secret.
#[derive(Debug, Clone)]
pub struct Credential {
    pub spec: SecretSpec,
    pub value: Option<SecretValue>,
    pub source: Option<CredentialSource>,
    /// A source held a placeholder that was skipped.
    pub placeholder_rejected: bool,
}

impl Credential {
    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }
}

/// Tries each backend in order; first valid value wins.
pub struct CredentialResolver {
    specs: Vec<SecretSpec>,
    sources: Vec<Box<dyn SecretSource>>,
}

impl CredentialResolver {
    pub fn new(specs: Vec<SecretSpec>) -> Self {
        Self {
            specs,
            sources: Vec::new(),
        }
    }

    /// Resolver for the client and indexing tokens.
    pub fn glean() -> Self {
        Self::new(vec![SecretSpec::client(), SecretSpec::indexing()])
    }

    /// Appends a backend with lower priority than those already added.
    pub fn with_source<S: SecretSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Adds the secret store, environment and `.env` backends described by
    /// `secrets`, in that priority order.
    pub fn with_configured_sources(mut self, secrets: &SecretsConfig) -> Result<Self> {
        if let Some(path) = &secrets.secret_store {
            self = self.with_source(SecretStore::from_json_file(path)?);
        }

        let env_files = if secrets.env_files.is_empty() {
            EnvFileSource::default_search_paths()
        } else {
            secrets.env_files.clone()
        };

        Ok(self
            .with_source(EnvVarSource)
            .with_source(EnvFileSource::from_paths(&env_files)))
    }

    pub fn resolve(&self) -> ResolvedCredentials {
        let credentials = self.specs.iter().map(|spec| self.resolve_one(spec)).collect();
        ResolvedCredentials { credentials }
    }

    fn resolve_one(&self, spec: &SecretSpec) -> Credential {
        let mut placeholder_rejected = false;

        for source in &self.sources {
            let Some(raw) = source.lookup(spec) else {
                continue;
            };

            if is_valid_key(&raw) {
                info!("Loaded {} from {}", spec.name, source.kind().describe());
                return Credential {
                    spec: spec.clone(),
                    value: Some(SecretValue::new(raw.trim())),
                    source: Some(source.kind()),
                    placeholder_rejected,
                };
            }

            if !raw.trim().is_empty() {
                warn!(
                    "{} in {} contains placeholder text; replace it with a real token",
                    spec.name,
                    source.kind().describe()
                );
                placeholder_rejected = true;
            }
        }

        Credential {
            spec: spec.clone(),
            value: None,
            source: None,
            placeholder_rejected,
        }
    }
}

/// Resolved tokens, fixed for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    credentials: Vec<Credential>,
}

impl ResolvedCredentials {
    pub fn get(&self, kind: CredentialKind) -> Option<&Credential> {
        self.credentials.iter().find(|c| c.spec.kind == kind)
    }

    pub fn is_loaded(&self, kind: CredentialKind) -> bool {
        self.get(kind).is_some_and(Credential::is_loaded)
    }

    /// The token for `kind`, or `MissingCredential`.
    pub fn require(&self, kind: CredentialKind) -> Result<&SecretValue> {
        match self.get(kind) {
            Some(Credential {
                value: Some(value), ..
            }) if !value.is_empty() => Ok(value),
            Some(credential) => Err(ClientError::missing_credential(&credential.spec.name)),
            None => Err(ClientError::missing_credential(format!("{kind} token"))),
        }
    }

    pub fn status_report(&self) -> StatusReport {
        StatusReport::from_credentials(&self.credentials)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    NoneLoaded,
    Missing(Vec<String>),
    MixedSources,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub name: String,
    /// Environment / `.env` spelling of `name`.
    pub env_name: String,
    pub loaded: bool,
    pub source: Option<CredentialSource>,
    pub placeholder_rejected: bool,
}

/// Diagnostic summary that never carries a token value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub lines: Vec<StatusLine>,
    pub readiness: Readiness,
}

impl StatusReport {
    fn from_credentials(credentials: &[Credential]) -> Self {
        let lines: Vec<StatusLine> = credentials
            .iter()
            .map(|c| StatusLine {
                name: c.spec.store_name.clone(),
                env_name: c.spec.name.clone(),
                loaded: c.is_loaded(),
                source: c.source,
                placeholder_rejected: c.placeholder_rejected,
            })
            .collect();

        let missing: Vec<String> = lines
            .iter()
            .filter(|l| !l.loaded)
            .map(|l| l.name.clone())
            .collect();

        let readiness = if !lines.is_empty() && missing.len() == lines.len() {
            Readiness::NoneLoaded
        } else if !missing.is_empty() {
            Readiness::Missing(missing)
        } else {
            let first = lines.first().and_then(|l| l.source);
            if lines.iter().all(|l| l.source == first) {
                Readiness::Ready
            } else {
                Readiness::MixedSources
            }
        };

        Self { lines, readiness }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.readiness, Readiness::Ready | Readiness::MixedSources)
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "API key status")?;
        writeln!(f, "==============")?;
        for line in &self.lines {
            match (line.loaded, line.source) {
                (true, Some(source)) => {
                    writeln!(f, "  {}: loaded from {}", line.name, source.describe())?
                }
                _ if line.placeholder_rejected => {
                    writeln!(f, "  {}: NOT FOUND (placeholder value ignored)", line.name)?
                }
                _ => writeln!(f, "  {}: NOT FOUND", line.name)?,
            }
        }

        match &self.readiness {
            Readiness::NoneLoaded => {
                writeln!(f, "\nNo API keys configured.")?;
                writeln!(f, "  Secret store: add GLEAN-CLIENT-API and GLEAN-INDEX-API")?;
                write!(
                    f,
                    "  .env file: add GLEAN_CLIENT_API=<token> and GLEAN_INDEX_API=<token>"
                )
            }
            Readiness::Missing(names) => {
                write!(f, "\nMissing: {}", names.join(", "))?;
                for loaded in self.lines.iter().filter(|l| l.loaded) {
                    let Some(source) = loaded.source else { continue };
                    for missing in self.lines.iter().filter(|l| !l.loaded) {
                        write!(
                            f,
                            "\n  {} is loaded from the {}; {}",
                            loaded.name,
                            source.describe(),
                            add_to_same_source(source, missing)
                        )?;
                    }
                }
                Ok(())
            }
            Readiness::MixedSources => write!(
                f,
                "\nWarning: keys come from different sources; consider keeping them in one place"
            ),
            Readiness::Ready => write!(f, "\nAll API keys loaded."),
        }
    }
}

fn add_to_same_source(source: CredentialSource, missing: &StatusLine) -> String {
    match source {
        CredentialSource::Override => {
            format!("pass {} as an explicit override too", missing.env_name)
        }
        CredentialSource::SecretStore => format!("add {} to the secret store", missing.name),
        CredentialSource::EnvVar => format!("export {}=<token>", missing.env_name),
        CredentialSource::EnvFile => {
            format!("add {}=<token> to the same .env file", missing.env_name)
        }
    }
}
