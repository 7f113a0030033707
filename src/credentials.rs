use std::collections::HashMap;
use std::env;

use parking_lot::RwLock;

use crate::error::{LlmWireError, Result};

/// 凭据标识
///
/// 每个标识对应一个约定俗成的环境变量名，未显式存入
/// [`CredentialStore`] 时从环境变量读取。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    OpenAiApiKey,
    AzureApiKey,
    AzureActiveDirectoryToken,
}

impl CredentialKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::OpenAiApiKey => "openai_api_key",
            CredentialKey::AzureApiKey => "azure_api_key",
            CredentialKey::AzureActiveDirectoryToken => "azure_active_directory_token",
        }
    }

    /// 对应的环境变量名
    pub fn env_var(&self) -> &'static str {
        match self {
            CredentialKey::OpenAiApiKey => "OPENAI_API_KEY",
            CredentialKey::AzureApiKey => "AZURE_OPENAI_API_KEY",
            CredentialKey::AzureActiveDirectoryToken => "AZURE_ACTIVE_DIRECTORY_TOKEN",
        }
    }
}

/// 凭据存储
///
/// 显式设置的值优先，其次回退到环境变量。值只在内存中保存，
/// 不随设置文件落盘。
#[derive(Default)]
pub struct CredentialStore {
    values: RwLock<HashMap<CredentialKey, String>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: CredentialKey, value: impl Into<String>) {
        self.values.write().insert(key, value.into());
    }

    pub fn clear(&self, key: CredentialKey) {
        self.values.write().remove(&key);
    }

    /// 读取凭据，未配置时返回 `None`
    pub fn get(&self, key: CredentialKey) -> Option<String> {
        if let Some(value) = self.values.read().get(&key) {
            return Some(value.clone());
        }
        env::var(key.env_var()).ok().filter(|v| !v.is_empty())
    }

    /// 读取凭据，未配置时报错并提示环境变量名
    pub fn require(&self, key: CredentialKey) -> Result<String> {
        self.get(key).ok_or_else(|| LlmWireError::MissingCredential {
            name: key.as_str().to_string(),
            env_var: key.env_var().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_value_wins_over_environment() {
        let store = CredentialStore::new();
        store.set(CredentialKey::OpenAiApiKey, "sk-from-store");
        assert_eq!(
            store.get(CredentialKey::OpenAiApiKey).as_deref(),
            Some("sk-from-store")
        );

        store.clear(CredentialKey::OpenAiApiKey);
        // 清除后回退到环境变量（测试环境中通常未设置）
        let fallback = store.get(CredentialKey::OpenAiApiKey);
        assert_eq!(fallback, env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty()));
    }

    #[test]
    fn missing_credential_names_env_var() {
        let store = CredentialStore::new();
        store.clear(CredentialKey::AzureActiveDirectoryToken);
        if env::var("AZURE_ACTIVE_DIRECTORY_TOKEN").is_ok() {
            return;
        }
        let err = store
            .require(CredentialKey::AzureActiveDirectoryToken)
            .unwrap_err();
        assert!(err.to_string().contains("AZURE_ACTIVE_DIRECTORY_TOKEN"));
    }
}
