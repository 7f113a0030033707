use std::str::FromStr;

use tracing::debug;

use crate::client::{AzureClient, HttpOptions, OpenAiClient, YouClient};
use crate::credentials::{CredentialKey, CredentialStore};
use crate::error::{LlmWireError, Result};
use crate::settings::SettingsState;

/// 服务商标识
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Azure,
    You,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Azure => "azure",
            ProviderKind::You => "you",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = LlmWireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "openai" => Ok(ProviderKind::OpenAi),
            "azure" => Ok(ProviderKind::Azure),
            "you" => Ok(ProviderKind::You),
            other => Err(LlmWireError::UnknownProvider(other.to_string())),
        }
    }
}

/// 完成客户端工厂
///
/// 从 [`SettingsState`] 与 [`CredentialStore`] 装配各服务客户端，
/// 共享参数统一应用到所有服务：
/// - 代理: 取 advanced 设置，host 非空且 port 非零时生效
/// - 代理凭据: 仅在勾选代理认证时附带
/// - 超时: connect/read 直接取设置值，读超时重试固定开启
/// - 服务凭据: 取 [`CredentialStore`]，缺失时报错并提示环境变量
pub struct ClientFactory;

impl ClientFactory {
    /// 装配 OpenAI 客户端
    pub fn openai(settings: &SettingsState, credentials: &CredentialStore) -> Result<OpenAiClient> {
        let api_key = credentials.require(CredentialKey::OpenAiApiKey)?;
        let options = Self::shared_options(settings);
        debug!(proxy = options.proxy.is_some(), "assembling openai client");

        let mut builder = OpenAiClient::builder(api_key)
            .host(&settings.openai.base_host)
            .model(&settings.openai.model)
            .http_options(options);
        if let Some(organization) = settings
            .openai
            .organization
            .as_deref()
            .filter(|o| !o.is_empty())
        {
            builder = builder.organization(organization);
        }
        builder.build()
    }

    /// 装配 Azure OpenAI 客户端
    ///
    /// `use_active_directory_auth` 决定取哪种凭据以及对应的认证头。
    pub fn azure(settings: &SettingsState, credentials: &CredentialStore) -> Result<AzureClient> {
        let azure = &settings.azure;
        let secret = if azure.use_active_directory_auth {
            credentials.require(CredentialKey::AzureActiveDirectoryToken)?
        } else {
            credentials.require(CredentialKey::AzureApiKey)?
        };
        let options = Self::shared_options(settings);
        debug!(proxy = options.proxy.is_some(), "assembling azure client");

        AzureClient::builder(secret)
            .active_directory_auth(azure.use_active_directory_auth)
            .host(azure.host())
            .deployment_id(&azure.deployment_id)
            .api_version(&azure.api_version)
            .http_options(options)
            .build()
    }

    /// 装配 You.com 客户端
    ///
    /// 会话凭据由调用方提供，连接参数与其他服务共享同一份设置。
    pub fn you(
        settings: &SettingsState,
        session_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<YouClient> {
        let options = Self::shared_options(settings);
        debug!(proxy = options.proxy.is_some(), "assembling you client");

        YouClient::builder(session_id, access_token)
            .host(&settings.you.base_host)
            .http_options(options)
            .build()
    }

    /// 各服务共用的 HTTP 选项
    pub fn shared_options(settings: &SettingsState) -> HttpOptions {
        HttpOptions::from_advanced(&settings.advanced)
    }
}
