use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmWireError>;

#[derive(Debug, Error)]
pub enum LlmWireError {
    #[error("unknown provider `{0}`")]
    UnknownProvider(String),
    #[error("credential `{name}` is not configured (set the `{env_var}` environment variable)")]
    MissingCredential { name: String, env_var: String },
    #[error("settings error: {0}")]
    Settings(String),
    #[error("invalid proxy `{url}`: {reason}")]
    InvalidProxy { url: String, reason: String },
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{provider} request failed with status {status}: {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },
    #[error("{provider} response is missing completion content")]
    MissingContent { provider: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
