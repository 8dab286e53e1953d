//! Relay Hook traits - 핵심 hook 인터페이스

use crate::context::HookContext;
use async_trait::async_trait;
use relayhook_foundation::{Error, Result};

// ============================================================================
// HookCapability - 추가 바디 변환 계약
// ============================================================================

/// hook이 구현하는 추가 바디 변환 계약
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookCapability {
    /// 업스트림 전 요청 바디 변환
    RequestModifier,
    /// 업스트림 후 응답 바디 변환
    ResponseProcessor,
    /// 스트리밍 청크 단위 변환
    StreamProcessor,
}

impl std::fmt::Display for HookCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestModifier => write!(f, "request-modifier"),
            Self::ResponseProcessor => write!(f, "response-processor"),
            Self::StreamProcessor => write!(f, "stream-processor"),
        }
    }
}

// ============================================================================
// RelayHook Trait
// ============================================================================

/// 릴레이 hook 트레이트
///
/// 세 단계 콜백은 모두 필수. 설정은 생성 시점에 고정되며 이후 바뀌지 않는다.
#[async_trait]
pub trait RelayHook: Send + Sync {
    /// 고유 이름 (대소문자 구분)
    fn name(&self) -> &str;

    /// 기본 우선순위 (클수록 먼저 실행)
    fn priority(&self) -> i32 {
        0
    }

    /// 생성 시 설정 기준 활성화 여부 (등록 시 `HookDescriptor::enabled` 의 초기값)
    fn enabled(&self) -> bool {
        true
    }

    /// 업스트림 호출 전
    async fn pre_request(&self, ctx: &mut HookContext) -> Result<()>;

    /// 업스트림 응답 수신 후, 클라이언트 응답 전
    async fn post_response(&self, ctx: &mut HookContext) -> Result<()>;

    /// 어느 단계에서든 에러 발생 시 (반환 에러는 로그만 남음)
    async fn on_error(&self, ctx: &mut HookContext, err: &Error) -> Result<()>;

    fn as_request_modifier(&self) -> Option<&dyn RequestModifier> {
        None
    }

    fn as_response_processor(&self) -> Option<&dyn ResponseProcessor> {
        None
    }

    fn as_stream_processor(&self) -> Option<&dyn StreamProcessor> {
        None
    }

    /// 구현된 추가 계약 목록
    fn capabilities(&self) -> Vec<HookCapability> {
        let mut caps = Vec::new();
        if self.as_request_modifier().is_some() {
            caps.push(HookCapability::RequestModifier);
        }
        if self.as_response_processor().is_some() {
            caps.push(HookCapability::ResponseProcessor);
        }
        if self.as_stream_processor().is_some() {
            caps.push(HookCapability::StreamProcessor);
        }
        caps
    }
}

// ============================================================================
// 바디 변환 계약
// ============================================================================

/// 요청 바디 변환
///
/// `Ok(Some(body))`면 바디 전체 교체, `Ok(None)`이면 변경 없음.
#[async_trait]
pub trait RequestModifier: Send + Sync {
    async fn modify_request(&self, ctx: &mut HookContext, body: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// 응답 바디 변환
#[async_trait]
pub trait ResponseProcessor: Send + Sync {
    async fn process_response(
        &self,
        ctx: &mut HookContext,
        body: &[u8],
    ) -> Result<Option<Vec<u8>>>;
}

/// SSE 청크 변환
#[async_trait]
pub trait StreamProcessor: Send + Sync {
    async fn process_chunk(&self, ctx: &mut HookContext, chunk: &[u8]) -> Result<Option<Vec<u8>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlainHook;

    #[async_trait]
    impl RelayHook for PlainHook {
        fn name(&self) -> &str {
            "plain"
        }

        async fn pre_request(&self, _ctx: &mut HookContext) -> Result<()> {
            Ok(())
        }

        async fn post_response(&self, _ctx: &mut HookContext) -> Result<()> {
            Ok(())
        }

        async fn on_error(&self, _ctx: &mut HookContext, _err: &Error) -> Result<()> {
            Ok(())
        }
    }

    struct UppercaseHook;

    #[async_trait]
    impl RelayHook for UppercaseHook {
        fn name(&self) -> &str {
            "uppercase"
        }

        fn priority(&self) -> i32 {
            10
        }

        async fn pre_request(&self, ctx: &mut HookContext) -> Result<()> {
            let body = ctx.request_body().to_vec();
            if let Some(new_body) = self.modify_request(ctx, &body).await? {
                ctx.set_request_body(new_body);
            }
            Ok(())
        }

        async fn post_response(&self, _ctx: &mut HookContext) -> Result<()> {
            Ok(())
        }

        async fn on_error(&self, _ctx: &mut HookContext, _err: &Error) -> Result<()> {
            Ok(())
        }

        fn as_request_modifier(&self) -> Option<&dyn RequestModifier> {
            Some(self)
        }
    }

    #[async_trait]
    impl RequestModifier for UppercaseHook {
        async fn modify_request(
            &self,
            _ctx: &mut HookContext,
            body: &[u8],
        ) -> Result<Option<Vec<u8>>> {
            Ok(Some(body.to_ascii_uppercase()))
        }
    }

    #[test]
    fn test_default_metadata() {
        let hook = PlainHook;
        assert_eq!(hook.priority(), 0);
        assert!(hook.enabled());
        assert!(hook.capabilities().is_empty());
    }

    #[tokio::test]
    async fn test_request_modifier_capability() {
        let hook = UppercaseHook;
        assert_eq!(hook.capabilities(), vec![HookCapability::RequestModifier]);

        let mut ctx = HookContext::default();
        ctx.set_request_body(b"abc".to_vec());
        hook.pre_request(&mut ctx).await.unwrap();
        assert_eq!(ctx.request_body(), b"ABC");
    }
}
