//! 完成服务客户端模块
//!
//! 每个服务一个客户端类型，通过各自的 Builder 装配：
//! - `OpenAiClient`: OpenAI chat completions
//! - `AzureClient`: Azure OpenAI 部署
//! - `YouClient`: You.com 对话搜索
//!
//! 共享的代理与超时参数由 [`HttpOptions`] 承载，
//! 流式响应统一经 [`SseParser`] 解析。

pub mod azure;
pub mod http;
pub mod openai;
pub mod sse;
pub mod types;
pub mod you;

pub use azure::{AzureClient, AzureClientBuilder};
pub use http::{HttpOptions, ProxyCredentials, ProxyOptions};
pub use openai::{OpenAiClient, OpenAiClientBuilder};
pub use sse::SseParser;
pub use types::{CompletionChunk, CompletionRequest, CompletionResponse, CompletionStream};
pub use you::{YouClient, YouClientBuilder};

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use crate::error::Result;

/// 完成服务客户端统一接口
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// 发起请求并返回完整补全
    ///
    /// 默认实现聚合 [`complete_stream`](Self::complete_stream) 的增量，
    /// 适用于只提供流式接口的服务。
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut stream = self.complete_stream(request);
        let mut content = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            content.push_str(&chunk.content);
            if chunk.done {
                break;
            }
        }
        Ok(CompletionResponse { content, raw: None })
    }

    /// 以流式方式返回增量内容，最后一个 chunk 的 `done` 为 true
    fn complete_stream(&self, request: CompletionRequest) -> CompletionStream;
}

pub type DynCompletionClient = Arc<dyn CompletionClient>;
