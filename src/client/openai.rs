use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::instrument;

use crate::client::http::{self, HttpOptions};
use crate::client::sse;
use crate::client::types::{CompletionRequest, CompletionResponse, CompletionStream};
use crate::client::CompletionClient;
use crate::error::{LlmWireError, Result};

const PROVIDER: &str = "openai";

/// OpenAI chat completions 客户端
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    organization: Option<String>,
    host: String,
    model: String,
    retry_on_read_timeout: bool,
}

impl OpenAiClient {
    pub fn builder(api_key: impl Into<String>) -> OpenAiClientBuilder {
        OpenAiClientBuilder::new(api_key)
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.host.trim_end_matches('/'))
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

        let mut body = json!({
            "model": self.model,
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
        let mut builder = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json");
        if let Some(organization) = &self.organization {
            builder = builder.header("OpenAI-Organization", organization);
        }
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
impl CompletionClient for OpenAiClient {
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

/// OpenAI 客户端 Builder
pub struct OpenAiClientBuilder {
    api_key: String,
    organization: Option<String>,
    host: String,
    model: String,
    options: HttpOptions,
}

impl OpenAiClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            organization: None,
            host: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            options: HttpOptions::default(),
        }
    }

    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn http_options(mut self, options: HttpOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<OpenAiClient> {
        let client = self.options.build_client()?;
        Ok(OpenAiClient {
            client,
            api_key: self.api_key,
            organization: self.organization,
            host: self.host,
            model: self.model,
            retry_on_read_timeout: self.options.retry_on_read_timeout,
        })
    }
}
