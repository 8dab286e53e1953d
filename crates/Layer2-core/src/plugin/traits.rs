//! Plugin traits - 채널/태스크 채널/미들웨어 플러그인 인터페이스
//!
//! 각 플러그인은 메타데이터와 `as_any()`로 노출하는 기능 묶음만 가진다.
//! 실제 기능은 호출자가 구체 타입으로 downcast 해서 사용한다.

use serde::{Deserialize, Serialize};
use std::any::Any;

/// 플러그인 메타데이터
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// 업스트림 채널 어댑터 (정수 채널 타입으로 식별)
pub trait ChannelPlugin: Send + Sync {
    fn channel_type(&self) -> i32;

    fn metadata(&self) -> PluginMetadata;

    fn as_any(&self) -> &dyn Any;
}

/// 비동기 태스크 플랫폼 어댑터 (플랫폼 문자열로 식별)
pub trait TaskChannelPlugin: Send + Sync {
    fn platform(&self) -> &str;

    fn metadata(&self) -> PluginMetadata;

    fn as_any(&self) -> &dyn Any;
}

/// HTTP 미들웨어 플러그인
pub trait Middleware: Send + Sync {
    fn name(&self) -> &str;

    /// 클수록 먼저
    fn priority(&self) -> i32 {
        0
    }

    fn enabled(&self) -> bool {
        true
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(self.name(), "0.0.0").with_priority(self.priority())
    }

    fn as_any(&self) -> &dyn Any;
}
