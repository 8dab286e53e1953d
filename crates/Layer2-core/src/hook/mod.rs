//! # Relay Hook System
//!
//! 업스트림 LLM 호출 전후로 요청/응답을 가로채는 hook 파이프라인
//!
//! ## 구성
//!
//! - `traits.rs` - `RelayHook` (세 단계 콜백) + 바디 변환 계약
//! - `registry.rs` - 이름 기준 중복 방지, 우선순위 정렬, 활성 목록
//! - `chain.rs` - 활성 목록 스냅샷을 단계별로 실행
//! - `builtin/` - 웹 검색 주입, 민감어 필터
//!
//! ## 단계별 에러 계약
//!
//! | 단계 | 실패 시 |
//! |------|---------|
//! | pre_request | 즉시 중단, hook 이름을 붙여 반환 |
//! | post_response | 즉시 중단, hook 이름을 붙여 반환 |
//! | on_error | 로그만 남기고 계속, 원래 에러 반환 |
//!
//! ## 예시
//!
//! ```ignore
//! let registry = Arc::new(HookRegistry::new());
//! registry.register_hook(Arc::new(MyHook))?;
//!
//! let chain = HookChain::loaded(registry);
//! chain.execute_pre_request(&mut ctx).await?;
//! ```

pub mod builtin;
mod chain;
mod registry;
mod traits;

pub use chain::HookChain;
pub use registry::{HookDescriptor, HookRegistry};
pub use traits::{HookCapability, RelayHook, RequestModifier, ResponseProcessor, StreamProcessor};
