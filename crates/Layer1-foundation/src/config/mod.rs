//! Config - 플러그인 설정 관리
//!
//! - `types.rs` - 설정 트리 (channels / middlewares / hooks)
//! - `env.rs` - `$VAR` / `${VAR}` 확장
//! - `loader.rs` - 경로 결정, 로드, 저장
//! - `global.rs` - 전역 캐시와 리로드

mod env;
mod global;
mod loader;
mod types;

pub use env::{expand_config_map, expand_env, expand_plugin_config, expand_with};
pub use global::{global_config, init_global_config, reload_global_config};
pub use loader::{
    load_plugin_config, load_plugin_config_from_file, load_plugin_config_or_default,
    resolve_config_path, save_plugin_config, DEFAULT_PLUGIN_CONFIG_PATH, PLUGIN_CONFIG_ENV,
};
pub use types::{
    ChannelPluginConfig, ConfigMap, HookPluginConfig, HooksConfig, MiddlewarePluginConfig,
    PluginConfig,
};
