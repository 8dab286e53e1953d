//! Ambient 요청 컨텍스트
//!
//! 앞단 미들웨어가 남긴 키-값(채널, 모델, 사용자 식별자)과 취소 토큰,
//! 그리고 인바운드/업스트림 HTTP 기술자.

use serde_json::Value;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// 미들웨어가 남기는 ambient 키 이름
pub mod keys {
    pub const CHANNEL_ID: &str = "channel_id";
    pub const CHANNEL_TYPE: &str = "channel_type";
    pub const CHANNEL_NAME: &str = "channel_name";
    /// 매핑 후 실제 업스트림 모델 (없으면 original_model)
    pub const MODEL_NAME: &str = "model_name";
    pub const ORIGINAL_MODEL: &str = "original_model";
    pub const USER_ID: &str = "user_id";
    pub const TOKEN_ID: &str = "token_id";
    pub const GROUP: &str = "group";
}

// ============================================================================
// RequestContext - 요청 처리 컨텍스트
// ============================================================================

/// 요청 처리 컨텍스트 (키-값 저장소 + 취소 신호)
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    values: HashMap<String, Value>,
    cancel: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 외부 취소 토큰 연결
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// 값 설정 (빌더)
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// 정수 값 (숫자 문자열 허용, 없으면 0)
    pub fn get_i64(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
            _ => 0,
        }
    }

    /// 문자열 값 (없으면 빈 문자열)
    pub fn get_string(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 취소될 때까지 대기
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

// ============================================================================
// HTTP 기술자
// ============================================================================

/// 인바운드 요청 기술자
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInfo {
    pub method: String,
    /// 쿼리 문자열 제외 경로
    pub path: String,
    pub query: Option<String>,
    pub headers: HashMap<String, String>,
}

impl RequestInfo {
    /// `"/v1/chat/completions?x=1"` 형태의 URI에서 생성
    pub fn new(method: impl Into<String>, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri.to_string(), None),
        };

        Self {
            method: method.into(),
            path,
            query,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// 헤더 조회 (대소문자 무시)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// chat completions 엔드포인트인지
    pub fn is_chat_completions(&self) -> bool {
        self.path.trim_end_matches('/').ends_with("chat/completions")
    }
}

/// 업스트림 응답 기술자
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseInfo {
    pub status: u16,
    pub headers: HashMap<String, String>,
}

impl ResponseInfo {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// SSE 스트리밍 응답인지
    pub fn is_event_stream(&self) -> bool {
        self.header("content-type")
            .map(|ct| ct.starts_with("text/event-stream"))
            .unwrap_or(false)
    }
}

impl Default for ResponseInfo {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_context_accessors() {
        let ctx = RequestContext::new()
            .with_value(keys::CHANNEL_ID, 7)
            .with_value(keys::TOKEN_ID, "42")
            .with_value(keys::GROUP, "vip");

        assert_eq!(ctx.get_i64(keys::CHANNEL_ID), 7);
        assert_eq!(ctx.get_i64(keys::TOKEN_ID), 42);
        assert_eq!(ctx.get_i64(keys::USER_ID), 0);
        assert_eq!(ctx.get_string(keys::GROUP), "vip");
        assert_eq!(ctx.get_string(keys::CHANNEL_NAME), "");
        assert_eq!(ctx.get(keys::CHANNEL_ID), Some(&json!(7)));
    }

    #[test]
    fn test_request_info_splits_query() {
        let info = RequestInfo::new("POST", "/v1/chat/completions?stream=true")
            .with_header("Content-Type", "application/json");

        assert_eq!(info.path, "/v1/chat/completions");
        assert_eq!(info.query.as_deref(), Some("stream=true"));
        assert_eq!(info.header("content-type"), Some("application/json"));
        assert!(info.is_chat_completions());
        assert!(!RequestInfo::new("POST", "/v1/embeddings").is_chat_completions());
    }

    #[test]
    fn test_response_info_stream_detection() {
        let resp = ResponseInfo::new(200).with_header("Content-Type", "text/event-stream; charset=utf-8");
        assert!(resp.is_success());
        assert!(resp.is_event_stream());
        assert!(!ResponseInfo::new(502).is_success());
    }

    #[test]
    fn test_cancellation_propagates() {
        let token = CancellationToken::new();
        let ctx = RequestContext::new().with_cancellation(token.clone());
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }
}
