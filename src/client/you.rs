use async_trait::async_trait;
use futures::StreamExt;
use tracing::instrument;

use crate::client::http::{self, HttpOptions};
use crate::client::sse;
use crate::client::types::{CompletionRequest, CompletionStream};
use crate::client::CompletionClient;
use crate::error::{LlmWireError, Result};

const PROVIDER: &str = "you";

/// You.com 对话搜索客户端
///
/// 接口只提供流式响应（`youChatToken` 事件），完整补全由
/// [`CompletionClient::complete`] 的默认实现聚合得到。
/// 会话凭据通过 Cookie 传递。
#[derive(Clone)]
pub struct YouClient {
    client: reqwest::Client,
    session_id: String,
    access_token: String,
    host: String,
    chat_id: Option<String>,
    query_trace_id: Option<String>,
    retry_on_read_timeout: bool,
}

impl YouClient {
    pub fn builder(
        session_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> YouClientBuilder {
        YouClientBuilder::new(session_id, access_token)
    }

    fn search_url(&self) -> String {
        format!("{}/api/streamingSearch", self.host.trim_end_matches('/'))
    }

    fn cookie(&self) -> String {
        format!(
            "stytch_session={}; ydc_stytch_session_jwt={}",
            self.session_id, self.access_token
        )
    }

    fn request_builder(&self, request: &CompletionRequest) -> reqwest::RequestBuilder {
        // 接口只接受问题本身，system/temperature 等参数在这里不适用
        let mut query = vec![("q", request.user.clone()), ("page", "1".to_string())];
        if let Some(chat_id) = &self.chat_id {
            query.push(("chatId", chat_id.clone()));
        }
        if let Some(trace_id) = &self.query_trace_id {
            query.push(("queryTraceId", trace_id.clone()));
        }

        self.client
            .get(self.search_url())
            .query(&query)
            .header("Accept", "text/event-stream")
            .header("Cookie", self.cookie())
    }

    #[instrument(skip(self, request))]
    async fn open_stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        let response =
            http::send_with_retry(self.request_builder(&request), self.retry_on_read_timeout)
                .await?;

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
impl CompletionClient for YouClient {
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

/// You 客户端 Builder
pub struct YouClientBuilder {
    session_id: String,
    access_token: String,
    host: String,
    chat_id: Option<String>,
    query_trace_id: Option<String>,
    options: HttpOptions,
}

impl YouClientBuilder {
    pub fn new(session_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            access_token: access_token.into(),
            host: "https://you.com".to_string(),
            chat_id: None,
            query_trace_id: None,
            options: HttpOptions::default(),
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    pub fn query_trace_id(mut self, query_trace_id: impl Into<String>) -> Self {
        self.query_trace_id = Some(query_trace_id.into());
        self
    }

    pub fn http_options(mut self, options: HttpOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<YouClient> {
        let client = self.options.build_client()?;
        Ok(YouClient {
            client,
            session_id: self.session_id,
            access_token: self.access_token,
            host: self.host,
            chat_id: self.chat_id,
            query_trace_id: self.query_trace_id,
            retry_on_read_timeout: self.options.retry_on_read_timeout,
        })
    }
}
