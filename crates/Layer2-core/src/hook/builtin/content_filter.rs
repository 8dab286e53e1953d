//! Content Filter Hook
//!
//! chat/completions 응답의 `choices[*].message.content` (스트리밍이면
//! `choices[*].delta.content`)에서 민감어를 치환한다. 파싱 실패는 무시한다.

use super::{is_truthy, process_env, EnvLookup, DEFAULT_BUILTIN_PRIORITY};
use crate::context::{scratch, HookContext};
use crate::hook::traits::{RelayHook, ResponseProcessor, StreamProcessor};
use async_trait::async_trait;
use relayhook_foundation::{Error, HookPluginConfig, Result};
use serde_json::Value;
use tracing::{debug, info};

/// 등록 이름
pub const CONTENT_FILTER_HOOK_NAME: &str = "content_filter";

/// 기본 치환 문자열
pub const DEFAULT_REPLACEMENT: &str = "***";

// ============================================================================
// Configuration
// ============================================================================

/// Content filter 설정
#[derive(Debug, Clone, PartialEq)]
pub struct ContentFilterConfig {
    pub enabled: bool,
    pub words: Vec<String>,
    pub replacement: String,
    pub priority: i32,
}

impl Default for ContentFilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            words: Vec::new(),
            replacement: DEFAULT_REPLACEMENT.to_string(),
            priority: DEFAULT_BUILTIN_PRIORITY,
        }
    }
}

impl ContentFilterConfig {
    pub fn new(words: impl IntoIterator<Item = impl Into<String>>, replacement: impl Into<String>) -> Self {
        Self {
            enabled: true,
            words: normalize_words(words.into_iter().map(Into::into)),
            replacement: replacement.into(),
            ..Self::default()
        }
    }

    /// 프로세스 환경변수만으로 구성
    pub fn from_env() -> Self {
        Self::resolve(None, &process_env)
    }

    /// 환경변수 + `hooks.relay` 항목으로 구성
    pub fn resolve(entry: Option<&HookPluginConfig>, env: EnvLookup<'_>) -> Self {
        let mut config = Self {
            enabled: is_truthy(env("CONTENT_FILTER_ENABLED").as_deref()),
            ..Self::default()
        };

        if let Some(words) = env("CONTENT_FILTER_WORDS") {
            config.words = split_words(&words);
        }
        if let Some(replacement) = env("CONTENT_FILTER_REPLACEMENT") {
            config.replacement = replacement;
        }

        if let Some(entry) = entry {
            config.enabled = entry.enabled;
            if let Some(priority) = entry.priority {
                config.priority = priority;
            }
            match entry.config.get("words") {
                Some(Value::Array(items)) => {
                    config.words =
                        normalize_words(items.iter().filter_map(Value::as_str).map(str::to_string));
                }
                Some(Value::String(list)) => config.words = split_words(list),
                _ => {}
            }
            if let Some(replacement) = entry.get_str("replacement") {
                config.replacement = replacement.to_string();
            }
        }

        config
    }

    /// 활성화 + 단어 목록 존재
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.words.is_empty()
    }
}

fn split_words(list: &str) -> Vec<String> {
    normalize_words(list.split(',').map(str::to_string))
}

/// 앞뒤 공백 제거 후 빈 단어 제외 (빈 문자열은 모든 위치에 매칭된다)
fn normalize_words(words: impl Iterator<Item = String>) -> Vec<String> {
    words
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

// ============================================================================
// Hook
// ============================================================================

/// 민감어 치환 hook
pub struct ContentFilterHook {
    config: ContentFilterConfig,
}

impl ContentFilterHook {
    pub fn new(config: ContentFilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContentFilterConfig {
        &self.config
    }

    /// 텍스트 치환 (치환 횟수 반환)
    fn filter_text(&self, text: &str) -> (String, usize) {
        let mut output = text.to_string();
        let mut count = 0;

        for word in self.config.words.iter().filter(|w| !w.is_empty()) {
            let hits = output.matches(word.as_str()).count();
            if hits > 0 {
                output = output.replace(word.as_str(), &self.config.replacement);
                count += hits;
            }
        }

        (output, count)
    }

    /// `choices[*].<field>.content` 치환
    fn filter_choices(&self, payload: &mut Value, field: &str) -> usize {
        let Some(choices) = payload.get_mut("choices").and_then(Value::as_array_mut) else {
            return 0;
        };

        let mut total = 0;
        for choice in choices {
            let Some(content) = choice.get_mut(field).and_then(|m| m.get_mut("content")) else {
                continue;
            };
            let Some(text) = content.as_str() else {
                continue;
            };

            let (filtered, count) = self.filter_text(text);
            if count > 0 {
                *content = Value::String(filtered);
                total += count;
            }
        }
        total
    }

    /// SSE 텍스트의 `data:` 줄마다 delta 치환 (줄바꿈은 그대로 유지)
    fn filter_sse(&self, text: &str) -> (String, usize) {
        let mut output = String::with_capacity(text.len());
        let mut total = 0;

        for line in text.split_inclusive('\n') {
            let (content, ending) = split_line_ending(line);
            match self.filter_sse_line(content) {
                Some((rewritten, count)) => {
                    output.push_str(&rewritten);
                    total += count;
                }
                None => output.push_str(content),
            }
            output.push_str(ending);
        }

        (output, total)
    }

    fn filter_sse_line(&self, line: &str) -> Option<(String, usize)> {
        let payload = line.strip_prefix("data:")?.trim_start();
        if payload == "[DONE]" {
            return None;
        }

        let mut event: Value = serde_json::from_str(payload).ok()?;
        let count = self.filter_choices(&mut event, "delta");
        if count == 0 {
            return None;
        }

        let json = serde_json::to_string(&event).ok()?;
        Some((format!("data: {}", json), count))
    }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

fn record_replacements(ctx: &mut HookContext, count: usize) {
    let previous = ctx
        .get(scratch::CONTENT_FILTER_REPLACEMENTS)
        .and_then(Value::as_u64)
        .unwrap_or(0);
    ctx.set(scratch::CONTENT_FILTERED, true);
    ctx.set(scratch::CONTENT_FILTER_REPLACEMENTS, previous + count as u64);
}

#[async_trait]
impl RelayHook for ContentFilterHook {
    fn name(&self) -> &str {
        CONTENT_FILTER_HOOK_NAME
    }

    fn priority(&self) -> i32 {
        self.config.priority
    }

    fn enabled(&self) -> bool {
        self.config.is_usable()
    }

    async fn pre_request(&self, _ctx: &mut HookContext) -> Result<()> {
        Ok(())
    }

    async fn post_response(&self, ctx: &mut HookContext) -> Result<()> {
        if !ctx.request.is_chat_completions() {
            return Ok(());
        }
        let Some(body) = ctx.response_body().filter(|b| !b.is_empty()).map(<[u8]>::to_vec) else {
            return Ok(());
        };

        let streaming = ctx.response.as_ref().is_some_and(|r| r.is_event_stream());
        let replaced = if streaming {
            self.process_chunk(ctx, &body).await?
        } else {
            self.process_response(ctx, &body).await?
        };

        if let Some(new_body) = replaced {
            ctx.set_response_body(new_body);
        }
        Ok(())
    }

    async fn on_error(&self, _ctx: &mut HookContext, _err: &Error) -> Result<()> {
        Ok(())
    }

    fn as_response_processor(&self) -> Option<&dyn ResponseProcessor> {
        Some(self)
    }

    fn as_stream_processor(&self) -> Option<&dyn StreamProcessor> {
        Some(self)
    }
}

#[async_trait]
impl ResponseProcessor for ContentFilterHook {
    async fn process_response(
        &self,
        ctx: &mut HookContext,
        body: &[u8],
    ) -> Result<Option<Vec<u8>>> {
        let Ok(mut payload) = serde_json::from_slice::<Value>(body) else {
            debug!("Response body is not JSON, skipping content filter");
            return Ok(None);
        };

        let count = self.filter_choices(&mut payload, "message");
        if count == 0 {
            return Ok(None);
        }

        let Ok(new_body) = serde_json::to_vec(&payload) else {
            return Ok(None);
        };
        record_replacements(ctx, count);
        info!(replacements = count, "Filtered sensitive words in response");
        Ok(Some(new_body))
    }
}

#[async_trait]
impl StreamProcessor for ContentFilterHook {
    async fn process_chunk(&self, ctx: &mut HookContext, chunk: &[u8]) -> Result<Option<Vec<u8>>> {
        let Ok(text) = std::str::from_utf8(chunk) else {
            return Ok(None);
        };

        let (filtered, count) = self.filter_sse(text);
        if count == 0 {
            return Ok(None);
        }

        record_replacements(ctx, count);
        debug!(replacements = count, "Filtered sensitive words in stream chunk");
        Ok(Some(filtered.into_bytes()))
    }
}
