//! `relayhook hooks` commands

use relayhook_core::{apply_hook_overrides, register_builtin_hooks, HookDescriptor, HookRegistry};
use relayhook_foundation::load_plugin_config_or_default;
use std::cmp::Reverse;
use std::path::Path;

/// 설정 + 환경변수로 레지스트리 구성 (CLI 전용, 전역 싱글톤 미사용)
pub fn build_registry(path: Option<&Path>) -> anyhow::Result<HookRegistry> {
    let config = load_plugin_config_or_default(path);
    let registry = HookRegistry::new();
    register_builtin_hooks(&registry, &config)?;
    apply_hook_overrides(&registry, &config)?;
    Ok(registry)
}

pub fn list(path: Option<&Path>) -> anyhow::Result<()> {
    let registry = build_registry(path)?;
    let hooks = listing_order(registry.list_all());

    if hooks.is_empty() {
        println!("No relay hooks registered.");
        println!("  Enable built-ins with WEB_SEARCH_ENABLED / CONTENT_FILTER_ENABLED or hooks.relay entries.");
        return Ok(());
    }

    println!("{:<20} {:>8}  {:<8}  CAPABILITIES", "NAME", "PRIORITY", "ENABLED");
    for descriptor in &hooks {
        let capabilities: Vec<String> = descriptor
            .capabilities()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "{:<20} {:>8}  {:<8}  {}",
            descriptor.name,
            descriptor.priority,
            if descriptor.enabled { "yes" } else { "no" },
            if capabilities.is_empty() {
                "-".to_string()
            } else {
                capabilities.join(", ")
            }
        );
    }

    Ok(())
}

/// 활성 hook 먼저, 그 안에서는 체인과 같은 순서 (우선순위 내림차순, 동률은 등록 순)
fn listing_order(mut hooks: Vec<HookDescriptor>) -> Vec<HookDescriptor> {
    hooks.sort_by_key(|d| (!d.enabled, Reverse(d.priority)));
    hooks
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relayhook_core::{Error, HookContext, RelayHook, Result};
    use std::sync::Arc;

    struct Named(&'static str, i32);

    #[async_trait]
    impl RelayHook for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn priority(&self) -> i32 {
            self.1
        }

        async fn pre_request(&self, _ctx: &mut HookContext) -> Result<()> {
            Ok(())
        }

        async fn post_response(&self, _ctx: &mut HookContext) -> Result<()> {
            Ok(())
        }

        async fn on_error(&self, _ctx: &mut HookContext, _err: &Error) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_listing_order() {
        let registry = HookRegistry::new();
        registry.register_hook(Arc::new(Named("low", 1))).unwrap();
        registry
            .register(HookDescriptor::new(Arc::new(Named("off", 500))).with_enabled(false))
            .unwrap();
        registry.register_hook(Arc::new(Named("tie_first", 50))).unwrap();
        registry.register_hook(Arc::new(Named("tie_second", 50))).unwrap();

        let names: Vec<String> = listing_order(registry.list_all())
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["tie_first", "tie_second", "low", "off"]);
    }
}
