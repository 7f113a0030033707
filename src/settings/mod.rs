//! 应用设置模块
//!
//! 各服务的连接设置与跨服务共享的高级设置（代理、超时）。
//! [`SettingsState`] 聚合全部设置，[`SettingsStore`] 负责 JSON 持久化。

pub mod advanced;
pub mod azure;
pub mod openai;
pub mod store;
pub mod you;

use serde::{Deserialize, Serialize};

pub use advanced::{AdvancedSettings, ProxyKind};
pub use azure::AzureSettings;
pub use openai::OpenAiSettings;
pub use store::SettingsStore;
pub use you::YouSettings;

/// 全部应用设置
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SettingsState {
    #[serde(default)]
    pub openai: OpenAiSettings,
    #[serde(default)]
    pub azure: AzureSettings,
    #[serde(default)]
    pub you: YouSettings,
    #[serde(default)]
    pub advanced: AdvancedSettings,
}
