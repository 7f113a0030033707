use serde::{Deserialize, Serialize};

/// Azure OpenAI 服务设置
///
/// Azure 将部署（deployment）作为请求路径的一部分，资源名注入
/// `base_host` 中的 `{resource}` 占位符。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AzureSettings {
    #[serde(default)]
    pub resource_name: String,
    #[serde(default)]
    pub deployment_id: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_base_host")]
    pub base_host: String,
    /// true 时使用 Active Directory 访问令牌，否则使用 API key
    #[serde(default)]
    pub use_active_directory_auth: bool,
}

fn default_api_version() -> String {
    "2023-05-15".to_string()
}

fn default_base_host() -> String {
    "https://{resource}.openai.azure.com".to_string()
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            resource_name: String::new(),
            deployment_id: String::new(),
            api_version: default_api_version(),
            base_host: default_base_host(),
            use_active_directory_auth: false,
        }
    }
}

impl AzureSettings {
    /// 资源对应的主机地址
    pub fn host(&self) -> String {
        self.base_host.replace("{resource}", &self.resource_name)
    }
}
