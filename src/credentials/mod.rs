pub mod resolver;
pub mod sources;

pub use resolver::{
    Credential, CredentialResolver, Readiness, ResolvedCredentials, StatusLine, StatusReport,
};
pub use sources::{
    is_valid_key, CredentialKind, CredentialSource, EnvFileSource, EnvVarSource, OverrideSource,
    SecretSource, SecretSpec, SecretStore, SecretValue,
};
