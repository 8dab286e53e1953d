//! Built-in relay hooks
//!
//! - `web_search` - 마지막 메시지의 마커를 보고 검색 결과를 system 메시지로 주입
//! - `content_filter` - 응답 본문의 민감어 치환 (일반 응답 + SSE 청크)
//!
//! 두 hook 모두 등록 시점에 환경변수와 `hooks.relay` 설정 항목을 읽어
//! 설정을 고정한다.

mod content_filter;
mod web_search;

pub use content_filter::{
    ContentFilterConfig, ContentFilterHook, CONTENT_FILTER_HOOK_NAME, DEFAULT_REPLACEMENT,
};
pub use web_search::{
    HttpSearchBackend, SearchBackend, SearchProvider, SearchResult, WebSearchConfig,
    WebSearchHook, SEARCH_MARKERS, WEB_SEARCH_HOOK_NAME,
};

/// 번들 hook 기본 우선순위
pub const DEFAULT_BUILTIN_PRIORITY: i32 = 100;

/// 환경변수 조회 함수 (테스트에서 교체 가능)
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// 프로세스 환경변수 조회
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// `true` / `1` / `yes` (대소문자 무시)
pub(crate) fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(Some("true")));
        assert!(is_truthy(Some(" YES ")));
        assert!(is_truthy(Some("1")));
        assert!(!is_truthy(Some("0")));
        assert!(!is_truthy(Some("")));
        assert!(!is_truthy(None));
    }
}
