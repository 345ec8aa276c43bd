use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ClientError, Result};

/// Which API surface a credential authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Client,
    Indexing,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Indexing => write!(f, "indexing"),
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSource {
    Override,
    SecretStore,
    EnvVar,
    EnvFile,
}

impl CredentialSource {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Override => "explicit override",
            Self::SecretStore => "secret store",
            Self::EnvVar => "environment variable",
            Self::EnvFile => ".env file",
        }
    }
}

/// A recognized secret: its environment name, secret store name and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretSpec {
    pub name: String,
    pub store_name: String,
    pub kind: CredentialKind,
}

impl SecretSpec {
    pub fn new<S: Into<String>>(name: S, kind: CredentialKind) -> Self {
        let name = name.into();
        let store_name = name.replace('_', "-");
        Self {
            name,
            store_name,
            kind,
        }
    }

    pub fn client() -> Self {
        Self::new("GLEAN_CLIENT_API", CredentialKind::Client)
    }

    pub fn indexing() -> Self {
        Self::new("GLEAN_INDEX_API", CredentialKind::Indexing)
    }
}

/// A token value that never prints itself.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(<redacted>)")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// A backend the resolver can ask for a named secret.
pub trait SecretSource: Send + Sync {
    fn kind(&self) -> CredentialSource;
    fn lookup(&self, spec: &SecretSpec) -> Option<String>;
}

/// Values supplied directly by the caller, keyed by environment name.
#[derive(Debug, Default, Clone)]
pub struct OverrideSource {
    values: HashMap<String, String>,
}

impl OverrideSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set_optional(mut self, name: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.values.insert(name.to_string(), value);
        }
        self
    }
}

impl SecretSource for OverrideSource {
    fn kind(&self) -> CredentialSource {
        CredentialSource::Override
    }

    fn lookup(&self, spec: &SecretSpec) -> Option<String> {
        self.values.get(&spec.name).cloned()
    }
}

/// Session secret store keyed by hyphenated store names,
/// e.g. `GLEAN-CLIENT-API`.
#[derive(Debug, Default, Clone)]
pub struct SecretStore {
    secrets: HashMap<String, String>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.secrets.insert(name.into(), value.into());
    }

    /// Reads a JSON object of `name -> value` pairs.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let secrets: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            ClientError::invalid_input(format!(
                "secret store {} is not a JSON object of strings: {e}",
                path.display()
            ))
        })?;
        debug!("Loaded {} entries from secret store {}", secrets.len(), path.display());
        Ok(Self { secrets })
    }
}

impl SecretSource for SecretStore {
    fn kind(&self) -> CredentialSource {
        CredentialSource::SecretStore
    }

    fn lookup(&self, spec: &SecretSpec) -> Option<String> {
        self.secrets.get(&spec.store_name).cloned()
    }
}

/// The process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvVarSource;

impl SecretSource for EnvVarSource {
    fn kind(&self) -> CredentialSource {
        CredentialSource::EnvVar
    }

    fn lookup(&self, spec: &SecretSpec) -> Option<String> {
        std::env::var(&spec.name).ok()
    }
}

/// `.env` files, parsed without touching the process environment.
/// Later files override earlier ones.
#[derive(Debug, Default, Clone)]
pub struct EnvFileSource {
    values: HashMap<String, String>,
    loaded_from: Vec<PathBuf>,
}

impl EnvFileSource {
    pub fn default_search_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(".env"),
            PathBuf::from("../.env"),
            PathBuf::from("../../.env"),
        ]
    }

    /// Parses every existing file among `paths`; missing files are skipped.
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        let mut source = Self::default();

        for path in paths {
            if !path.is_file() {
                continue;
            }
            match dotenv::from_path_iter(path) {
                Ok(iter) => {
                    for item in iter {
                        match item {
                            Ok((key, value)) => {
                                source.values.insert(key, value);
                            }
                            Err(e) => {
                                warn!("Skipping unparseable line in {}: {e}", path.display());
                            }
                        }
                    }
                    source.loaded_from.push(path.clone());
                }
                Err(e) => warn!("Could not read {}: {e}", path.display()),
            }
        }

        source
    }

    pub fn loaded_from(&self) -> &[PathBuf] {
        &self.loaded_from
    }
}

impl SecretSource for EnvFileSource {
    fn kind(&self) -> CredentialSource {
        CredentialSource::EnvFile
    }

    fn lookup(&self, spec: &SecretSpec) -> Option<String> {
        self.values.get(&spec.name).cloned()
    }
}

const INVALID_PLACEHOLDERS: &[&str] = &[
    "your_client_api_token_here",
    "your_client_token_here",
    "your_indexing_api_token_here",
    "your_indexing_token_here",
    "your_api_token_here",
    "your_token_here",
    "your_key_here",
    "paste_your_token_here",
    "add_your_token_here",
];

/// False for empty values and template placeholders such as
/// `your_client_token_here`.
pub fn is_valid_key(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }

    let lower = trimmed.to_lowercase();
    if INVALID_PLACEHOLDERS.contains(&lower.as_str()) {
        return false;
    }

    !(lower.contains("your_") && lower.contains("_here"))
}
