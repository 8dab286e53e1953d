//! # Hook Context
//!
//! 릴레이 요청 하나가 hook 체인을 통과하는 동안 들고 다니는 상태
//!
//! - `ambient.rs` - 미들웨어가 남긴 키-값, 취소 신호, HTTP 기술자
//! - `hook_context.rs` - 요청/응답 바디, 식별 정보, scratch 맵, skip 플래그
//! - `builder.rs` - ambient → HookContext 변환, 바디/응답 부착

mod ambient;
mod builder;
mod hook_context;

pub use ambient::{keys, RequestContext, RequestInfo, ResponseInfo};
pub use builder::{attach_request_body, attach_response, build_hook_context};
pub use hook_context::HookContext;

/// 번들 hook이 scratch 맵에 남기는 키
///
/// 뒤에 실행되는 hook이나 릴레이 핸들러가 이 키로 결과를 확인한다.
pub mod scratch {
    /// `bool` - 웹 검색 결과가 요청에 주입됨
    pub const WEB_SEARCH_PERFORMED: &str = "web_search_performed";
    /// `string` - 마커를 제거한 검색어
    pub const WEB_SEARCH_QUERY: &str = "web_search_query";
    /// `bool` - 응답에서 민감어가 치환됨
    pub const CONTENT_FILTERED: &str = "content_filtered";
    /// `number` - 치환 횟수
    pub const CONTENT_FILTER_REPLACEMENTS: &str = "content_filter_replacements";
}
