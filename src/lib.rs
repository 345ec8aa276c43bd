pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;

pub use client::GleanClient;
pub use config::Config;
pub use credentials::{CredentialResolver, ResolvedCredentials};
pub use error::{ClientError, Result};
