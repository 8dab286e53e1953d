//! Bootstrap - 번들 hook 등록과 프로세스 전역 싱글톤
//!
//! 전역 인스턴스는 첫 사용 시 한 번 생성되고 프로세스 종료까지 유지된다.
//! 테스트는 전역 대신 새 레지스트리/체인을 만들어 쓴다.

use crate::hook::builtin::{
    process_env, ContentFilterConfig, ContentFilterHook, EnvLookup, WebSearchConfig,
    WebSearchHook, CONTENT_FILTER_HOOK_NAME, WEB_SEARCH_HOOK_NAME,
};
use crate::hook::{HookChain, HookRegistry, RelayHook};
use crate::plugin::{ChannelRegistry, MiddlewareRegistry, TaskChannelRegistry};
use relayhook_foundation::{global_config, reload_global_config, PluginConfig, Result};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

// ============================================================================
// 번들 hook 등록
// ============================================================================

/// 번들 hook 을 프로세스 환경변수 + 설정 트리로 구성해 등록
///
/// 사용 가능한 (활성 + 자격 증명 존재) hook 만 등록하며, 이미 같은 이름이
/// 있으면 건너뛴다. 등록한 개수를 반환한다.
pub fn register_builtin_hooks(registry: &HookRegistry, config: &PluginConfig) -> Result<usize> {
    register_builtin_hooks_with(registry, config, &process_env)
}

/// 환경변수 조회 함수를 지정해 등록
pub fn register_builtin_hooks_with(
    registry: &HookRegistry,
    config: &PluginConfig,
    env: EnvLookup<'_>,
) -> Result<usize> {
    let candidates: [(&str, Option<Arc<dyn RelayHook>>); 2] = [
        (WEB_SEARCH_HOOK_NAME, {
            let cfg = WebSearchConfig::resolve(config.relay_hook(WEB_SEARCH_HOOK_NAME), env);
            cfg.is_usable()
                .then(|| Arc::new(WebSearchHook::new(cfg)) as Arc<dyn RelayHook>)
        }),
        (CONTENT_FILTER_HOOK_NAME, {
            let cfg = ContentFilterConfig::resolve(config.relay_hook(CONTENT_FILTER_HOOK_NAME), env);
            cfg.is_usable()
                .then(|| Arc::new(ContentFilterHook::new(cfg)) as Arc<dyn RelayHook>)
        }),
    ];

    let mut registered = 0;
    for (name, hook) in candidates {
        if registry.has(name) {
            continue;
        }
        match hook {
            Some(hook) => {
                registry.register_hook(hook)?;
                registered += 1;
            }
            None => debug!("Built-in hook {} not enabled", name),
        }
    }

    Ok(registered)
}

/// `hooks.relay` 항목의 enabled/priority 를 등록된 hook 에 반영
///
/// 설정 항목이 없는 hook 은 그대로 둔다.
pub fn apply_hook_overrides(registry: &HookRegistry, config: &PluginConfig) -> Result<()> {
    for descriptor in registry.list_all() {
        let Some(entry) = config.relay_hook(&descriptor.name) else {
            continue;
        };
        if descriptor.enabled != entry.enabled {
            registry.set_enabled(&descriptor.name, entry.enabled)?;
        }
        if let Some(priority) = entry.priority {
            registry.set_priority(&descriptor.name, priority)?;
        }
    }
    Ok(())
}

/// 설정 변경 반영: 오버라이드 적용 → 새로 사용 가능해진 번들 hook 등록 → 체인 리로드
pub fn reload_hooks(
    registry: &HookRegistry,
    chain: &HookChain,
    config: &PluginConfig,
    env: EnvLookup<'_>,
) -> Result<()> {
    apply_hook_overrides(registry, config)?;
    let added = register_builtin_hooks_with(registry, config, env)?;
    chain.reload();

    info!(
        "Reloaded hooks: {} registered ({} new), {} active",
        registry.count(),
        added,
        chain.len()
    );
    Ok(())
}

// ============================================================================
// 전역 싱글톤
// ============================================================================

static HOOK_REGISTRY: OnceLock<Arc<HookRegistry>> = OnceLock::new();
static HOOK_CHAIN: OnceLock<Arc<HookChain>> = OnceLock::new();
static CHANNEL_REGISTRY: OnceLock<Arc<ChannelRegistry>> = OnceLock::new();
static TASK_CHANNEL_REGISTRY: OnceLock<Arc<TaskChannelRegistry>> = OnceLock::new();
static MIDDLEWARE_REGISTRY: OnceLock<Arc<MiddlewareRegistry>> = OnceLock::new();

/// 전역 hook 레지스트리 (최초 호출 시 전역 설정으로 번들 hook 등록)
pub fn global_hook_registry() -> Arc<HookRegistry> {
    HOOK_REGISTRY
        .get_or_init(|| {
            let registry = HookRegistry::new();
            let config = global_config();
            if let Err(e) = register_builtin_hooks(&registry, &config) {
                warn!("Failed to register built-in hooks: {}", e);
            }
            if let Err(e) = apply_hook_overrides(&registry, &config) {
                warn!("Failed to apply hook overrides: {}", e);
            }
            Arc::new(registry)
        })
        .clone()
}

/// 전역 hook 체인 (전역 레지스트리로 로드된 상태)
pub fn global_hook_chain() -> Arc<HookChain> {
    HOOK_CHAIN
        .get_or_init(|| Arc::new(HookChain::loaded(global_hook_registry())))
        .clone()
}

/// 전역 설정을 다시 읽고 전역 체인에 반영
pub fn reload_global_hooks() -> Result<()> {
    let config = reload_global_config();
    reload_hooks(
        &global_hook_registry(),
        &global_hook_chain(),
        &config,
        &process_env,
    )
}

pub fn global_channel_registry() -> Arc<ChannelRegistry> {
    CHANNEL_REGISTRY
        .get_or_init(|| Arc::new(ChannelRegistry::new()))
        .clone()
}

pub fn global_task_channel_registry() -> Arc<TaskChannelRegistry> {
    TASK_CHANNEL_REGISTRY
        .get_or_init(|| Arc::new(TaskChannelRegistry::new()))
        .clone()
}

pub fn global_middleware_registry() -> Arc<MiddlewareRegistry> {
    MIDDLEWARE_REGISTRY
        .get_or_init(|| Arc::new(MiddlewareRegistry::new()))
        .clone()
}
