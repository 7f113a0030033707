pub mod client;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod settings;
pub mod utils;

pub use client::{
    AzureClient, AzureClientBuilder, CompletionChunk, CompletionClient, CompletionRequest,
    CompletionResponse, CompletionStream, DynCompletionClient, HttpOptions, OpenAiClient,
    OpenAiClientBuilder, ProxyCredentials, ProxyOptions, SseParser, YouClient, YouClientBuilder,
};
pub use credentials::{CredentialKey, CredentialStore};
pub use error::{LlmWireError, Result};
pub use factory::{ClientFactory, ProviderKind};
pub use settings::{
    AdvancedSettings, AzureSettings, OpenAiSettings, ProxyKind, SettingsState, SettingsStore,
    YouSettings,
};
pub use utils::LoggingConfig;
