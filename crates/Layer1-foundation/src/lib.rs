//! # relayhook-foundation
//!
//! Foundation layer for RelayHook:
//! - Error: 레지스트리/설정/Hook 체인 에러 분류
//! - Config: 플러그인 설정 트리 (YAML), 환경변수 확장, 전역 캐시
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  plugins.yaml                                           │
//! │       │  (PLUGIN_CONFIG_PATH / config/plugins.yaml)     │
//! │       ▼                                                 │
//! │  load_plugin_config ──► expand_plugin_config ($VAR)     │
//! │       │                                                 │
//! │       ▼                                                 │
//! │  global_config() ◄── reload_global_config()             │
//! │       │                                                 │
//! │       ▼                                                 │
//! │  relayhook-core (Hook Registry / Chain 시드)            │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, HookPhase, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    // Env
    expand_env,
    expand_plugin_config,
    // Global
    global_config,
    init_global_config,
    // Loader
    load_plugin_config,
    load_plugin_config_from_file,
    load_plugin_config_or_default,
    reload_global_config,
    resolve_config_path,
    save_plugin_config,
    // Types
    ChannelPluginConfig,
    ConfigMap,
    HookPluginConfig,
    HooksConfig,
    MiddlewarePluginConfig,
    PluginConfig,
    DEFAULT_PLUGIN_CONFIG_PATH,
    PLUGIN_CONFIG_ENV,
};
