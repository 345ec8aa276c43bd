pub mod settings;

pub use settings::{Config, HttpConfig, IndexingConfig, InstanceConfig, SecretsConfig};
