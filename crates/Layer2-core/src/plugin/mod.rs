//! # Plugin Catalogs
//!
//! hook 레지스트리와 나란히 존재하는 세 카탈로그
//!
//! | 레지스트리 | 키 | 목록 |
//! |-----------|----|------|
//! | `ChannelRegistry` | 채널 타입 (i32) | 등록 순 |
//! | `TaskChannelRegistry` | 플랫폼 문자열 | 등록 순 |
//! | `MiddlewareRegistry` | 이름 | 우선순위 내림차순, 활성 전용 목록 |

mod registry;
mod traits;

pub use registry::{ChannelRegistry, MiddlewareRegistry, TaskChannelRegistry};
pub use traits::{ChannelPlugin, Middleware, PluginMetadata, TaskChannelPlugin};
