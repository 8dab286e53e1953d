//! relayhook-core: Core Runtime for RelayHook
//!
//! Layer2 - 릴레이 요청 hook 파이프라인
//!
//! # 주요 모듈
//!
//! - `context`: 요청 하나의 Hook Context (바디, 식별 정보, scratch 맵, skip)
//! - `hook`: Hook 트레이트, 레지스트리, 스냅샷 체인, 번들 hook
//! - `plugin`: 채널 / 태스크 채널 / 미들웨어 카탈로그
//! - `pipeline`: 업스트림 호출을 hook 단계로 감싸는 실행기
//! - `bootstrap`: 번들 hook 등록, 전역 싱글톤, 설정 리로드
//!
//! # 사용 예시
//!
//! ```ignore
//! use relayhook_core::{build_hook_context, global_hook_chain, RelayPipeline};
//!
//! let mut ctx = build_hook_context(&ambient, RequestInfo::new("POST", "/v1/chat/completions"));
//! let pipeline = RelayPipeline::new(global_hook_chain());
//! pipeline.relay(&mut ctx, body, &upstream).await?;
//!
//! let response = ctx.response_body();
//! ```

pub mod bootstrap;
pub mod context;
pub mod hook;
pub mod pipeline;
pub mod plugin;

// ============================================================================
// Re-exports
// ============================================================================

pub use bootstrap::{
    apply_hook_overrides, global_channel_registry, global_hook_chain, global_hook_registry,
    global_middleware_registry, global_task_channel_registry, register_builtin_hooks,
    register_builtin_hooks_with, reload_global_hooks, reload_hooks,
};
pub use context::{
    attach_request_body, attach_response, build_hook_context, keys, scratch, HookContext,
    RequestContext, RequestInfo, ResponseInfo,
};
pub use hook::builtin::{
    ContentFilterConfig, ContentFilterHook, SearchBackend, SearchProvider, SearchResult,
    WebSearchConfig, WebSearchHook,
};
pub use hook::{
    HookCapability, HookChain, HookDescriptor, HookRegistry, RelayHook, RequestModifier,
    ResponseProcessor, StreamProcessor,
};
pub use pipeline::{RelayPipeline, Upstream, UpstreamResponse};
pub use plugin::{
    ChannelPlugin, ChannelRegistry, Middleware, MiddlewareRegistry, PluginMetadata,
    TaskChannelPlugin, TaskChannelRegistry,
};

// Re-export foundation for convenience
pub use relayhook_foundation::{Error, HookPhase, PluginConfig, Result};
