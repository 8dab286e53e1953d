//! Relay Pipeline - 업스트림 호출을 hook 단계로 감싸기
//!
//! 순서: 요청 바디 부착 → pre_request → 업스트림 → 응답 부착 → post_response.
//! 어느 단계든 실패하면 on_error 를 돌린 뒤 원래 에러를 돌려준다.
//! hook 목록은 요청 시작 시점의 체인 스냅샷으로 고정된다.

use crate::context::{attach_request_body, attach_response, HookContext, ResponseInfo};
use crate::hook::HookChain;
use async_trait::async_trait;
use relayhook_foundation::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// 업스트림 응답
#[derive(Debug, Clone, Default)]
pub struct UpstreamResponse {
    pub info: ResponseInfo,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn new(info: ResponseInfo, body: impl Into<Vec<u8>>) -> Self {
        Self {
            info,
            body: body.into(),
        }
    }
}

/// 업스트림 LLM 호출 (어댑터 집합은 외부에 있다)
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn dispatch(&self, ctx: &HookContext) -> Result<UpstreamResponse>;
}

/// hook 체인으로 감싼 릴레이 실행기
#[derive(Debug, Clone)]
pub struct RelayPipeline {
    chain: Arc<HookChain>,
}

impl RelayPipeline {
    pub fn new(chain: Arc<HookChain>) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &Arc<HookChain> {
        &self.chain
    }

    /// 요청 하나를 릴레이
    ///
    /// 성공 시 최종 요청/응답 바디는 `ctx`에 남는다.
    pub async fn relay(
        &self,
        ctx: &mut HookContext,
        body: Vec<u8>,
        upstream: &dyn Upstream,
    ) -> Result<()> {
        attach_request_body(ctx, body);
        // pre_request 부터 on_error, 이후 스트림 청크까지 같은 hook 목록
        self.chain.pin(ctx);

        match self.run(ctx, upstream).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.chain.execute_on_error(ctx, e).await),
        }
    }

    /// 스트리밍 응답의 청크 하나를 처리 (실패 시 on_error 후 에러 반환)
    pub async fn relay_chunk(&self, ctx: &mut HookContext, chunk: Vec<u8>) -> Result<Vec<u8>> {
        match self.chain.process_stream_chunk(ctx, chunk).await {
            Ok(chunk) => Ok(chunk),
            Err(e) => Err(self.chain.execute_on_error(ctx, e).await),
        }
    }

    async fn run(&self, ctx: &mut HookContext, upstream: &dyn Upstream) -> Result<()> {
        self.chain.execute_pre_request(ctx).await?;

        let token = ctx.request_ctx.cancellation_token().clone();
        let response = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Error::Cancelled),
            response = upstream.dispatch(ctx) => response?,
        };
        debug!(
            status = response.info.status,
            bytes = response.body.len(),
            "Upstream responded"
        );

        attach_response(ctx, response.body, response.info);
        self.chain.execute_post_response(ctx).await
    }
}
