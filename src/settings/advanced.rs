use serde::{Deserialize, Serialize};

/// 代理类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyKind {
    Http,
    Socks,
}

impl Default for ProxyKind {
    fn default() -> Self {
        ProxyKind::Http
    }
}

impl ProxyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Http => "http",
            ProxyKind::Socks => "socks",
        }
    }

    /// 代理 URL 的 scheme
    ///
    /// SOCKS 使用 `socks5h`，主机名交由代理端解析。
    pub fn scheme(&self) -> &'static str {
        match self {
            ProxyKind::Http => "http",
            ProxyKind::Socks => "socks5h",
        }
    }
}

/// 跨服务共享的连接设置
///
/// 代理仅在 `proxy_host` 非空且 `proxy_port` 非零时生效；
/// 代理凭据仅在 `proxy_auth_selected` 时附带。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdvancedSettings {
    #[serde(default)]
    pub proxy_kind: ProxyKind,
    #[serde(default)]
    pub proxy_host: String,
    #[serde(default)]
    pub proxy_port: u16,
    #[serde(default)]
    pub proxy_auth_selected: bool,
    #[serde(default)]
    pub proxy_username: String,
    #[serde(default)]
    pub proxy_password: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    60
}

fn default_read_timeout() -> u64 {
    600
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            proxy_kind: ProxyKind::default(),
            proxy_host: String::new(),
            proxy_port: 0,
            proxy_auth_selected: false,
            proxy_username: String::new(),
            proxy_password: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}
