use std::time::Duration;

use tracing::debug;

use crate::error::{LlmWireError, Result};
use crate::settings::{AdvancedSettings, ProxyKind};

/// 代理认证凭据
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

/// 生效的代理参数
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyOptions {
    pub kind: ProxyKind,
    pub host: String,
    pub port: u16,
    pub credentials: Option<ProxyCredentials>,
}

impl ProxyOptions {
    /// 传给 `reqwest::Proxy` 的代理地址
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.kind.scheme(), self.host, self.port)
    }
}

/// 跨服务共享的 HTTP 选项
///
/// 由 [`AdvancedSettings`] 推导，再交给各客户端构建 `reqwest::Client`。
#[derive(Clone, Debug, PartialEq)]
pub struct HttpOptions {
    pub proxy: Option<ProxyOptions>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub retry_on_read_timeout: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self::from_advanced(&AdvancedSettings::default())
    }
}

impl HttpOptions {
    /// 从高级设置推导共享选项
    ///
    /// 代理仅在 `proxy_host` 非空且 `proxy_port` 非零时生效，
    /// 凭据仅在勾选代理认证时附带。
    pub fn from_advanced(advanced: &AdvancedSettings) -> Self {
        let proxy = if !advanced.proxy_host.is_empty() && advanced.proxy_port != 0 {
            let credentials = if advanced.proxy_auth_selected {
                Some(ProxyCredentials {
                    username: advanced.proxy_username.clone(),
                    password: advanced.proxy_password.clone(),
                })
            } else {
                None
            };
            Some(ProxyOptions {
                kind: advanced.proxy_kind,
                host: advanced.proxy_host.clone(),
                port: advanced.proxy_port,
                credentials,
            })
        } else {
            None
        };

        Self {
            proxy,
            connect_timeout: Duration::from_secs(advanced.connect_timeout_secs),
            read_timeout: Duration::from_secs(advanced.read_timeout_secs),
            retry_on_read_timeout: true,
        }
    }

    /// 按当前选项构建 `reqwest::Client`
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout);

        if let Some(proxy) = &self.proxy {
            let url = proxy.url();
            let mut p = reqwest::Proxy::all(&url).map_err(|e| LlmWireError::InvalidProxy {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            if let Some(credentials) = &proxy.credentials {
                p = p.basic_auth(&credentials.username, &credentials.password);
            }
            builder = builder.proxy(p);
        }

        Ok(builder.build()?)
    }
}

/// 发送请求，读超时时按需重试一次
pub(crate) async fn send_with_retry(
    request: reqwest::RequestBuilder,
    retry_on_read_timeout: bool,
) -> Result<reqwest::Response> {
    if !retry_on_read_timeout {
        return Ok(request.send().await?);
    }

    let retry = request.try_clone();
    match request.send().await {
        Ok(response) => Ok(response),
        Err(e) if e.is_timeout() => match retry {
            Some(builder) => {
                debug!("request timed out, retrying once");
                Ok(builder.send().await?)
            }
            None => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

/// 读取非成功响应的正文并截断，用于错误信息
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    truncate_body(&text)
}

pub(crate) fn truncate_body(text: &str) -> String {
    const LIMIT: usize = 500;
    if text.len() <= LIMIT {
        return text.to_string();
    }
    let mut end = LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...({} bytes total)", &text[..end], text.len())
}
