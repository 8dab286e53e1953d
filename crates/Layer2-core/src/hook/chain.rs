//! Hook Chain - 스냅샷 기반 단계 실행기
//!
//! `load()` 시점의 활성 hook 목록을 복사해 두고, 요청마다 그 스냅샷을
//! 순서대로 실행한다. 요청은 첫 단계에서 스냅샷을 `HookContext`에 고정하고
//! 이후 단계(post_response, on_error, 스트림 청크)는 고정된 목록만 쓰므로
//! 도중에 `reload()`가 일어나도 시작할 때 잡은 목록으로 끝까지 간다.

use super::registry::{HookDescriptor, HookRegistry};
use super::traits::RelayHook;
use crate::context::HookContext;
use arc_swap::ArcSwap;
use futures::FutureExt;
use relayhook_foundation::{Error, HookPhase, Result};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 실패 시 중단되는 두 단계
#[derive(Debug, Clone, Copy)]
enum MainPhase {
    PreRequest,
    PostResponse,
}

impl From<MainPhase> for HookPhase {
    fn from(phase: MainPhase) -> Self {
        match phase {
            MainPhase::PreRequest => HookPhase::PreRequest,
            MainPhase::PostResponse => HookPhase::PostResponse,
        }
    }
}

/// Hook 체인
pub struct HookChain {
    registry: Arc<HookRegistry>,
    snapshot: ArcSwap<Vec<HookDescriptor>>,
}

impl HookChain {
    /// 빈 스냅샷으로 생성 (`load()` 전까지 아무 hook도 실행하지 않음)
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self {
            registry,
            snapshot: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// 생성 후 즉시 로드
    pub fn loaded(registry: Arc<HookRegistry>) -> Self {
        let chain = Self::new(registry);
        chain.load();
        chain
    }

    /// 레지스트리의 활성 목록으로 스냅샷 교체
    pub fn load(&self) {
        let enabled = self.registry.list_enabled();
        info!("Hook chain loaded with {} hook(s)", enabled.len());
        self.snapshot.store(Arc::new(enabled));
    }

    /// 설정 변경 콜백용
    pub fn reload(&self) {
        self.load();
    }

    /// 현재 스냅샷
    pub fn snapshot(&self) -> Arc<Vec<HookDescriptor>> {
        self.snapshot.load_full()
    }

    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    /// 요청에 현재 스냅샷을 고정 (이미 고정되어 있으면 그 목록을 그대로 반환)
    pub fn pin(&self, ctx: &mut HookContext) -> Arc<Vec<HookDescriptor>> {
        if let Some(pinned) = ctx.pinned_hooks() {
            return pinned.clone();
        }
        let snapshot = self.snapshot.load_full();
        ctx.pin_hooks(snapshot.clone());
        snapshot
    }

    // ========================================================================
    // 단계 실행
    // ========================================================================

    /// 업스트림 호출 전 단계 (첫 실패에서 중단)
    pub async fn execute_pre_request(&self, ctx: &mut HookContext) -> Result<()> {
        self.run_phase(ctx, MainPhase::PreRequest).await
    }

    /// 업스트림 응답 후 단계 (첫 실패에서 중단)
    pub async fn execute_post_response(&self, ctx: &mut HookContext) -> Result<()> {
        self.run_phase(ctx, MainPhase::PostResponse).await
    }

    /// 에러 단계
    ///
    /// 모든 hook의 on_error를 호출하고 실패는 로그만 남긴다.
    /// skip 플래그와 무관하게 전부 시도하며, 원래 에러를 그대로 돌려준다.
    pub async fn execute_on_error(&self, ctx: &mut HookContext, err: Error) -> Error {
        ctx.record_error(&err);
        let snapshot = self.pin(ctx);

        for descriptor in snapshot.iter().filter(|d| is_active(d)) {
            let hook = descriptor.hook.as_ref();
            debug!(hook = %descriptor.name, "Running on_error hook");

            if let Err(e) = guarded(hook.on_error(ctx, &err)).await {
                warn!(hook = %descriptor.name, error = %e, "on_error hook failed");
            }
        }

        err
    }

    /// SSE 청크 하나를 스트림 처리기들에 순서대로 통과시킨다
    pub async fn process_stream_chunk(
        &self,
        ctx: &mut HookContext,
        chunk: Vec<u8>,
    ) -> Result<Vec<u8>> {
        ctx.reset_skip();
        let snapshot = self.pin(ctx);
        let mut chunk = chunk;

        for descriptor in snapshot.iter() {
            if ctx.should_skip() {
                debug!(hook = %descriptor.name, "Skipping remaining stream processors");
                break;
            }
            if !is_active(descriptor) {
                continue;
            }
            let Some(processor) = descriptor.hook.as_stream_processor() else {
                continue;
            };

            let outcome = guarded(processor.process_chunk(ctx, &chunk)).await;
            match outcome {
                Ok(Some(replaced)) => chunk = replaced,
                Ok(None) => {}
                Err(e) => {
                    return Err(Error::hook_phase(&descriptor.name, HookPhase::StreamChunk, e));
                }
            }
        }

        Ok(chunk)
    }

    async fn run_phase(&self, ctx: &mut HookContext, phase: MainPhase) -> Result<()> {
        ctx.reset_skip();
        let snapshot = self.pin(ctx);

        for descriptor in snapshot.iter() {
            if ctx.should_skip() {
                debug!(hook = %descriptor.name, ?phase, "Skip flag set, ending phase");
                break;
            }
            if !is_active(descriptor) {
                continue;
            }

            debug!(hook = %descriptor.name, ?phase, "Running hook");
            let hook: &dyn RelayHook = descriptor.hook.as_ref();
            let outcome = match phase {
                MainPhase::PreRequest => guarded(hook.pre_request(ctx)).await,
                MainPhase::PostResponse => guarded(hook.post_response(ctx)).await,
            };

            if let Err(e) = outcome {
                return Err(Error::hook_phase(&descriptor.name, phase.into(), e));
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for HookChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("snapshot", &self.snapshot.load())
            .finish()
    }
}

/// 활성 여부는 스냅샷에 잡힌 플래그만 본다 (`hook.enabled()`는 등록 시 시드로만 쓰임)
fn is_active(descriptor: &HookDescriptor) -> bool {
    descriptor.enabled
}

/// hook 콜백의 panic을 해당 hook의 에러로 변환
async fn guarded<T, F>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(Error::hook(format!(
            "hook panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
