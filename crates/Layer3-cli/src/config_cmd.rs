//! `relayhook config` commands

use anyhow::{bail, Context};
use relayhook_foundation::{
    load_plugin_config, load_plugin_config_from_file, resolve_config_path, save_plugin_config,
    ChannelPluginConfig, HookPluginConfig, MiddlewarePluginConfig, PluginConfig,
};
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;

/// 샘플 설정 트리 (번들 hook 은 비활성 상태로 포함)
pub fn sample_config() -> PluginConfig {
    let mut config = PluginConfig::new();

    config.channels.insert(
        "openai".to_string(),
        ChannelPluginConfig {
            priority: 10,
            ..Default::default()
        },
    );

    config.middlewares.push(MiddlewarePluginConfig {
        name: "request_logger".to_string(),
        enabled: true,
        priority: 100,
        config: [("level".to_string(), json!("info"))].into_iter().collect(),
    });

    config.hooks.relay.push(
        HookPluginConfig::new("web_search")
            .with_enabled(false)
            .with_priority(100)
            .with_config("provider", json!("${WEB_SEARCH_PROVIDER:-tavily}"))
            .with_config("api_key", json!("$WEB_SEARCH_API_KEY"))
            .with_config("max_results", json!(5)),
    );
    config.hooks.relay.push(
        HookPluginConfig::new("content_filter")
            .with_enabled(false)
            .with_priority(50)
            .with_config("words", json!(["password", "secret"]))
            .with_config("replacement", json!("***")),
    );

    config
}

pub fn init(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let target = resolve_config_path(path);

    if target.exists() && !force {
        println!("✓ Config already exists at {}", target.display());
        println!("  Use --force to overwrite.");
        return Ok(());
    }

    save_plugin_config(&sample_config(), &target)
        .with_context(|| format!("failed to write {}", target.display()))?;
    println!("✓ Wrote sample config to {}", target.display());
    Ok(())
}

pub fn show(path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_plugin_config(path)?;
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

pub fn validate(path: Option<&Path>) -> anyhow::Result<()> {
    let target = resolve_config_path(path);
    if !target.exists() {
        bail!("config file not found: {}", target.display());
    }

    let config = load_plugin_config_from_file(&target)?;
    let problems = find_problems(&config);

    if problems.is_empty() {
        println!(
            "✓ {} is valid ({} channels, {} middlewares, {} relay hooks)",
            target.display(),
            config.channels.len(),
            config.middlewares.len(),
            config.hooks.relay.len()
        );
        return Ok(());
    }

    for problem in &problems {
        eprintln!("✗ {}", problem);
    }
    bail!("{} problem(s) found in {}", problems.len(), target.display())
}

/// 파싱은 되지만 등록 시 실패할 항목들
fn find_problems(config: &PluginConfig) -> Vec<String> {
    let mut problems = Vec::new();

    let mut seen = HashSet::new();
    for hook in &config.hooks.relay {
        if hook.name.trim().is_empty() {
            problems.push("hooks.relay: entry with empty name".to_string());
        } else if !seen.insert(hook.name.as_str()) {
            problems.push(format!("hooks.relay: duplicate name '{}'", hook.name));
        }
    }

    let mut seen = HashSet::new();
    for middleware in &config.middlewares {
        if middleware.name.trim().is_empty() {
            problems.push("middlewares: entry with empty name".to_string());
        } else if !seen.insert(middleware.name.as_str()) {
            problems.push(format!("middlewares: duplicate name '{}'", middleware.name));
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_config_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config").join("plugins.yaml");

        init(Some(&path), false).unwrap();
        let loaded = load_plugin_config(Some(&path)).unwrap();

        assert_eq!(loaded.hooks.relay.len(), 2);
        assert!(!loaded.relay_hook("web_search").unwrap().enabled);
        assert_eq!(loaded.relay_hook("content_filter").unwrap().priority, Some(50));
        assert!(loaded.channel("openai").is_some());
        assert!(find_problems(&loaded).is_empty());
        validate(Some(&path)).unwrap();
    }

    #[test]
    fn test_validate_reports_duplicates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plugins.yaml");
        std::fs::write(
            &path,
            "hooks:\n  relay:\n    - name: a\n    - name: a\nmiddlewares:\n  - name: \"\"\n",
        )
        .unwrap();

        let config = load_plugin_config_from_file(&path).unwrap();
        let problems = find_problems(&config);
        assert_eq!(problems.len(), 2);
        assert!(validate(Some(&path)).is_err());
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempdir().unwrap();
        assert!(validate(Some(&dir.path().join("nope.yaml"))).is_err());
    }
}
