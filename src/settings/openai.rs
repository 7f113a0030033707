use serde::{Deserialize, Serialize};

/// OpenAI 服务设置
///
/// `base_host` 可替换为任何兼容 OpenAI API 的网关地址。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_base_host")]
    pub base_host: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_base_host() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_host: default_base_host(),
            organization: None,
            model: default_model(),
        }
    }
}
