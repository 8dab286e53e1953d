//! Error types for RelayHook
//!
//! 레지스트리, 설정 로더, Hook 체인의 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Hook 라이프사이클 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// 업스트림 호출 전
    PreRequest,
    /// 업스트림 응답 수신 후
    PostResponse,
    /// 에러 발생 시
    OnError,
    /// 스트리밍 청크 처리
    StreamChunk,
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreRequest => write!(f, "pre_request"),
            Self::PostResponse => write!(f, "post_response"),
            Self::OnError => write!(f, "on_error"),
            Self::StreamChunk => write!(f, "stream_chunk"),
        }
    }
}

/// RelayHook 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 레지스트리 관련
    // ========================================================================
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    #[error("Duplicate type: {0}")]
    DuplicateType(i32),

    #[error("Not found: {0}")]
    NotFound(String),

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Config parse error: {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("Config IO error: {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ========================================================================
    // Hook 관련
    // ========================================================================
    /// 체인이 hook 이름을 붙여 올려보내는 단계 실패
    #[error("hook {hook} failed in {phase}: {source}")]
    HookPhase {
        hook: String,
        phase: HookPhase,
        #[source]
        source: Box<Error>,
    },

    /// hook 콜백 자체가 반환한 실패
    #[error("{0}")]
    Hook(String),

    // ========================================================================
    // 실행 관련
    // ========================================================================
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// hook 단계 실패 생성 헬퍼
    pub fn hook_phase(hook: impl Into<String>, phase: HookPhase, source: Error) -> Self {
        Error::HookPhase {
            hook: hook.into(),
            phase,
            source: Box::new(source),
        }
    }

    /// hook 콜백 에러 생성 헬퍼
    pub fn hook(message: impl Into<String>) -> Self {
        Error::Hook(message.into())
    }

    /// 설정 파싱 에러 생성 헬퍼
    pub fn config_parse(path: impl Into<String>, message: impl ToString) -> Self {
        Error::ConfigParse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// 중복 등록 에러인지 확인
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateName(_) | Error::DuplicateType(_))
    }

    /// NotFound 에러인지 확인
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// 설정 로드 실패인지 확인 (기본값으로 대체 가능)
    pub fn is_config(&self) -> bool {
        matches!(self, Error::ConfigParse { .. } | Error::ConfigIo { .. })
    }

    /// 실패한 hook 이름 (HookPhase 에러일 때)
    pub fn failed_hook(&self) -> Option<&str> {
        match self {
            Error::HookPhase { hook, .. } => Some(hook),
            _ => None,
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_phase_prepends_name() {
        let err = Error::hook_phase("web_search", HookPhase::PreRequest, Error::hook("boom"));
        assert_eq!(err.to_string(), "hook web_search failed in pre_request: boom");
        assert_eq!(err.failed_hook(), Some("web_search"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::DuplicateName("x".into()).is_duplicate());
        assert!(Error::DuplicateType(3).is_duplicate());
        assert!(Error::NotFound("x".into()).is_not_found());
        assert!(Error::config_parse("a.yaml", "bad").is_config());
        assert!(!Error::Cancelled.is_config());
    }
}
