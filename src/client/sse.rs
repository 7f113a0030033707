use std::collections::VecDeque;

use futures::StreamExt;
use serde_json::Value;

use crate::client::types::{CompletionChunk, CompletionStream};
use crate::error::LlmWireError;

/// SSE 流式响应解析器
///
/// 增量接收字节流，按空行切分事件并提取内容增量。
/// 识别不了的事件（心跳、元数据等）直接跳过。
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// 解析一段字节，返回其中完整事件对应的 chunk 列表
    ///
    /// SSE 格式：
    /// ```text
    /// data: {"choices":[{"delta":{"content":"Hello"}}]}
    ///
    /// event: youChatToken
    /// data: {"youChatToken": "Hi"}
    ///
    /// data: [DONE]
    /// ```
    pub fn parse_chunk(&mut self, data: &[u8]) -> Vec<CompletionChunk> {
        self.buffer.extend_from_slice(data);

        let mut chunks = Vec::new();
        let mut consumed = 0;

        while let Some((end_pos, sep_len)) = find_event_end(&self.buffer[consumed..]) {
            let boundary = consumed + end_pos;
            // 事件边界已完整，这里转字符串不会截断多字节字符
            let event_text = String::from_utf8_lossy(&self.buffer[consumed..boundary]);

            if let Some(chunk) = self.parse_event(&event_text) {
                chunks.push(chunk);
            }

            consumed = boundary + sep_len;
        }

        if consumed > 0 {
            self.buffer.drain(..consumed);
        }

        chunks
    }

    /// 解析单个 SSE 事件
    fn parse_event(&self, event_text: &str) -> Option<CompletionChunk> {
        let mut event_name = None;
        let mut data_lines = Vec::new();
        for line in event_text.lines() {
            let line = line.trim_end_matches('\r');
            if let Some(rest) = line.strip_prefix("event:") {
                event_name = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("data:") {
                data_lines.push(rest.trim_start());
            }
        }

        let data = if data_lines.is_empty() {
            event_text.trim().to_string()
        } else {
            data_lines.join("\n")
        };

        if data.trim() == "[DONE]" || event_name.as_deref() == Some("done") {
            return Some(CompletionChunk {
                content: String::new(),
                done: true,
            });
        }

        let json: Value = match serde_json::from_str(&data) {
            Ok(json) => json,
            Err(_) => return None,
        };

        let content = self.extract_content_delta(&json);
        if content.is_empty() {
            None
        } else {
            Some(CompletionChunk {
                content,
                done: false,
            })
        }
    }

    /// 从 JSON 中提取内容增量
    ///
    /// 支持的格式：
    /// - chat completions: choices[0].delta.content
    /// - You: youChatToken
    fn extract_content_delta(&self, json: &Value) -> String {
        if let Some(content) = json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice["delta"]["content"].as_str())
        {
            return content.to_string();
        }

        if let Some(content) = json["youChatToken"].as_str() {
            return content.to_string();
        }

        String::new()
    }

    /// 清空 buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// 找到第一个事件终止空行，返回其起点和分隔符长度
fn find_event_end(buffer: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buffer.len() {
        if buffer[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
        if buffer[i..].starts_with(b"\n\n") {
            return Some((i, 2));
        }
    }
    None
}

/// 将 SSE 响应体包装为 chunk 流
///
/// 服务端发送结束事件或连接正常关闭时，流以一个 `done` chunk 收尾，
/// 且保证只出现一次。
pub(crate) fn sse_stream(response: reqwest::Response) -> CompletionStream {
    let bytes = Box::pin(response.bytes_stream());
    let parser = SseParser::new();
    let pending: VecDeque<CompletionChunk> = VecDeque::new();

    Box::pin(futures::stream::unfold(
        (bytes, parser, pending, false),
        move |(mut bytes, mut parser, mut pending, mut finished)| async move {
            loop {
                if let Some(chunk) = pending.pop_front() {
                    if chunk.done {
                        finished = true;
                        pending.clear();
                    }
                    return Some((Ok(chunk), (bytes, parser, pending, finished)));
                }
                if finished {
                    return None;
                }

                match bytes.next().await {
                    Some(Ok(data)) => {
                        pending.extend(parser.parse_chunk(&data));
                    }
                    Some(Err(e)) => {
                        finished = true;
                        return Some((
                            Err(LlmWireError::Transport(e)),
                            (bytes, parser, pending, finished),
                        ));
                    }
                    None => {
                        finished = true;
                        return Some((
                            Ok(CompletionChunk {
                                content: String::new(),
                                done: true,
                            }),
                            (bytes, parser, pending, finished),
                        ));
                    }
                }
            }
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chat_completions_sse() {
        let mut parser = SseParser::new();
        let data = b"data: {\"id\":\"chatcmpl-9xQ2\",\"choices\":[{\"delta\":{\"content\":\"The\"}}]}\n\ndata: {\"id\":\"chatcmpl-9xQ2\",\"choices\":[{\"delta\":{\"content\":\" answer\"}}]}\n\n";

        let chunks = parser.parse_chunk(data);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "The");
        assert_eq!(chunks[1].content, " answer");
    }

    #[test]
    fn parse_done_marker() {
        let mut parser = SseParser::new();
        let chunks = parser.parse_chunk(b"data: [DONE]\n\n");
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].done);
    }

    #[test]
    fn parse_you_chat_token_events() {
        let mut parser = SseParser::new();
        let data = b"event: youChatToken\ndata: {\"youChatToken\": \"Hi\"}\n\nevent: done\ndata: {}\n\n";

        let chunks = parser.parse_chunk(data);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "Hi");
        assert!(!chunks[0].done);
        assert!(chunks[1].done);
    }

    #[test]
    fn crlf_terminated_events_are_split() {
        let mut parser = SseParser::new();
        let data = b"event: youChatToken\r\ndata: {\"youChatToken\": \"Go\"}\r\n\r\nevent: done\r\ndata: {}\r\n\r\n";

        let chunks = parser.parse_chunk(data);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "Go");
        assert!(chunks[1].done);
    }

    #[test]
    fn event_split_across_chunks_is_buffered() {
        let mut parser = SseParser::new();
        let first = parser.parse_chunk(b"data: {\"choices\":[{\"delta\":{\"con");
        assert!(first.is_empty());

        let second = parser.parse_chunk(b"tent\":\"Hello\"}}]}\n\n");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].content, "Hello");
    }

    #[test]
    fn multibyte_content_survives_chunk_boundary() {
        let mut parser = SseParser::new();
        let event = "data: {\"choices\":[{\"delta\":{\"content\":\"你好\"}}]}\n\n".as_bytes();
        let (head, tail) = event.split_at(event.len() - 9);

        assert!(parser.parse_chunk(head).is_empty());
        let chunks = parser.parse_chunk(tail);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "你好");
    }

    #[test]
    fn unrecognized_events_are_skipped() {
        let mut parser = SseParser::new();
        let data = b"event: youChatUpdate\ndata: {\"search\":[]}\n\n: keep-alive\n\ndata: not json\n\n";
        assert!(parser.parse_chunk(data).is_empty());
    }
}
