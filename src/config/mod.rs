//! Configuration Store: persisted provider credentials with
//! environment-variable overlay (config file wins on conflict).

mod store;
mod types;

pub use store::{ConfigStore, SharedConfigStore};
pub use types::{
    CompatibleSubtype, ConfigError, GatewayConfig, ProviderCredential, ProviderExtras,
    ProviderKind, VectorConfig, CURRENT_SCHEMA_VERSION, PROVIDER_PRIORITY,
};
