//! HookContext - 요청 하나가 체인을 따라 들고 다니는 상태

use super::ambient::{RequestContext, RequestInfo, ResponseInfo};
use crate::hook::HookDescriptor;
use relayhook_foundation::Error;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Hook 실행 컨텍스트
///
/// 요청마다 하나씩 생성되어 해당 요청만 소유한다. 바디는 항상 통째로
/// 교체되므로 뒤따르는 hook은 변경 전 또는 변경 후 바이트만 보게 된다.
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    /// ambient 요청 컨텍스트 (키-값 + 취소 신호)
    pub request_ctx: RequestContext,

    /// 인바운드 요청
    pub request: RequestInfo,
    request_body: Vec<u8>,

    /// 업스트림 응답 (post_response 단계부터)
    pub response: Option<ResponseInfo>,
    response_body: Option<Vec<u8>>,

    // 채널
    pub channel_id: i64,
    pub channel_type: i32,
    pub channel_name: String,

    // 모델
    pub model_name: String,
    pub original_model: String,

    // 사용자
    pub user_id: i64,
    pub token_id: i64,
    pub group: String,

    /// hook 사이 공유 데이터 (키는 `scratch` 모듈 참고)
    data: HashMap<String, Value>,

    /// 마지막으로 관측된 에러
    last_error: Option<String>,

    /// 현재 단계의 나머지 hook 건너뛰기
    skip: bool,

    /// 첫 단계에서 고정된 hook 스냅샷 (이후 단계와 스트림 청크가 재사용)
    hooks: Option<Arc<Vec<HookDescriptor>>>,
}

impl HookContext {
    pub fn new(request_ctx: RequestContext, request: RequestInfo) -> Self {
        Self {
            request_ctx,
            request,
            ..Default::default()
        }
    }

    // ========================================================================
    // 요청 바디
    // ========================================================================

    pub fn request_body(&self) -> &[u8] {
        &self.request_body
    }

    /// 요청 바디 전체 교체
    pub fn set_request_body(&mut self, body: Vec<u8>) {
        self.request_body = body;
    }

    /// 요청 바디를 JSON으로 파싱
    pub fn request_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.request_body).ok()
    }

    // ========================================================================
    // 응답 바디
    // ========================================================================

    pub fn response_body(&self) -> Option<&[u8]> {
        self.response_body.as_deref()
    }

    /// 응답 바디 전체 교체
    pub fn set_response_body(&mut self, body: Vec<u8>) {
        self.response_body = Some(body);
    }

    /// 응답이 도착했는지
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    // ========================================================================
    // Scratch 데이터
    // ========================================================================

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.data.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// 전체 scratch 맵
    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    // ========================================================================
    // Skip 플래그
    // ========================================================================

    /// 현재 단계의 남은 hook 실행 중단 (되돌릴 수 없음)
    pub fn skip_remaining(&mut self) {
        self.skip = true;
    }

    pub fn should_skip(&self) -> bool {
        self.skip
    }

    /// 단계 시작 시 체인만 호출
    pub(crate) fn reset_skip(&mut self) {
        self.skip = false;
    }

    // ========================================================================
    // 고정 스냅샷
    // ========================================================================

    pub(crate) fn pinned_hooks(&self) -> Option<&Arc<Vec<HookDescriptor>>> {
        self.hooks.as_ref()
    }

    pub(crate) fn pin_hooks(&mut self, hooks: Arc<Vec<HookDescriptor>>) {
        self.hooks = Some(hooks);
    }

    /// 이 요청이 실행할 hook 이름 (아직 고정 전이면 None)
    pub fn pinned_hook_names(&self) -> Option<Vec<&str>> {
        self.hooks
            .as_ref()
            .map(|hooks| hooks.iter().map(|d| d.name.as_str()).collect())
    }

    // ========================================================================
    // 에러 / 취소
    // ========================================================================

    pub fn record_error(&mut self, err: &Error) {
        self.last_error = Some(err.to_string());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.request_ctx.is_cancelled()
    }
}
