use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::instrument;

use crate::client::http::{self, HttpOptions};
use crate::client::sse;
use crate::client::types::{CompletionRequest, CompletionResponse, CompletionStream};
use crate::client::CompletionClient;
use crate::error::{LlmWireError, Result};

const PROVIDER: &str = "azure";

/// Azure OpenAI 客户端
///
/// 部署（deployment）编码在请求路径中，认证方式二选一：
/// API key 走 `api-key` 头，Active Directory 令牌走 `Authorization: Bearer`。
#[derive(Clone)]
pub struct AzureClient {
    client: reqwest::Client,
    secret: String,
    active_directory_auth: bool,
    host: String,
    deployment_id: String,
    api_version: String,
    retry_on_read_timeout: bool,
}

impl AzureClient {
    pub fn builder(secret: impl Into<String>) -> AzureClientBuilder {
        AzureClientBuilder::new(secret)
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.host.trim_end_matches('/'),
            self.deployment_id,
            self.api_version
        )
    }

    fn request_body(&self, request: &CompletionRequest, stream: bool) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({
                "role": "system",
                "content": system
            }));
        }
        messages.push(json!({
            "role": "user",
            "content": request.user
        }));

        // 模型由部署决定，请求体中不再携带
        let mut body = json!({
            "messages": messages,
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if stream {
            body["stream"] = json!(true);
        }
        body
    }

    fn request_builder(&self, body: &Value) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json");
        let builder = if self.active_directory_auth {
            builder.bearer_auth(&self.secret)
        } else {
            builder.header("api-key", &self.secret)
        };
        builder.json(body)
    }

    #[instrument(skip(self, request))]
    async fn open_stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        let body = self.request_body(&request, true);
        let response =
            http::send_with_retry(self.request_builder(&body), self.retry_on_read_timeout).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmWireError::Api {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body: http::error_body(response).await,
            });
        }
        Ok(sse::sse_stream(response))
    }
}

#[async_trait]
impl CompletionClient for AzureClient {
    #[instrument(skip(self, request))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.request_body(&request, false);
        let response =
            http::send_with_retry(self.request_builder(&body), self.retry_on_read_timeout).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmWireError::Api {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body: http::error_body(response).await,
            });
        }

        let payload: Value = response.json().await?;
        let content = payload["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| LlmWireError::MissingContent {
                provider: PROVIDER.to_string(),
            })?
            .to_string();

        Ok(CompletionResponse {
            content,
            raw: Some(payload),
        })
    }

    fn complete_stream(&self, request: CompletionRequest) -> CompletionStream {
        let client = self.clone();
        Box::pin(
            futures::stream::once(async move {
                match client.open_stream(request).await {
                    Ok(stream) => stream,
                    Err(e) => {
                        Box::pin(futures::stream::once(async move { Err(e) })) as CompletionStream
                    }
                }
            })
            .flatten(),
        )
    }
}

/// Azure 客户端 Builder
pub struct AzureClientBuilder {
    secret: String,
    active_directory_auth: bool,
    host: String,
    deployment_id: String,
    api_version: String,
    options: HttpOptions,
}

impl AzureClientBuilder {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            active_directory_auth: false,
            host: String::new(),
            deployment_id: String::new(),
            api_version: "2023-05-15".to_string(),
            options: HttpOptions::default(),
        }
    }

    pub fn active_directory_auth(mut self, enabled: bool) -> Self {
        self.active_directory_auth = enabled;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn deployment_id(mut self, deployment_id: impl Into<String>) -> Self {
        self.deployment_id = deployment_id.into();
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn http_options(mut self, options: HttpOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<AzureClient> {
        if self.host.is_empty() {
            return Err(LlmWireError::Settings(
                "azure host is not configured (set a resource name)".to_string(),
            ));
        }
        if self.deployment_id.is_empty() {
            return Err(LlmWireError::Settings(
                "azure deployment id is not configured".to_string(),
            ));
        }

        let client = self.options.build_client()?;
        Ok(AzureClient {
            client,
            secret: self.secret,
            active_directory_auth: self.active_directory_auth,
            host: self.host,
            deployment_id: self.deployment_id,
            api_version: self.api_version,
            retry_on_read_timeout: self.options.retry_on_read_timeout,
        })
    }
}
