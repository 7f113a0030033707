use serde::{Deserialize, Serialize};

/// You.com 对话服务设置
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YouSettings {
    #[serde(default = "default_base_host")]
    pub base_host: String,
}

fn default_base_host() -> String {
    "https://you.com".to_string()
}

impl Default for YouSettings {
    fn default() -> Self {
        Self {
            base_host: default_base_host(),
        }
    }
}
