//! Plugin Config Loader
//!
//! ## 경로 결정 순서
//!
//! 1. 명시적 인자
//! 2. `PLUGIN_CONFIG_PATH` 환경변수
//! 3. 기본 경로 `config/plugins.yaml`
//!
//! 파일이 없으면 빈 기본 트리를 반환한다.

use super::env::expand_plugin_config;
use super::types::PluginConfig;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 설정 경로 오버라이드 환경변수
pub const PLUGIN_CONFIG_ENV: &str = "PLUGIN_CONFIG_PATH";

/// 기본 설정 파일 경로
pub const DEFAULT_PLUGIN_CONFIG_PATH: &str = "config/plugins.yaml";

/// 설정 파일 경로 결정
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    match std::env::var(PLUGIN_CONFIG_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_PLUGIN_CONFIG_PATH),
    }
}

/// 설정 로드
///
/// 파일이 없으면 `Ok(PluginConfig::default())`. 읽기/파싱 실패는 에러로 반환.
pub fn load_plugin_config(explicit: Option<&Path>) -> Result<PluginConfig> {
    let path = resolve_config_path(explicit);

    if !path.exists() {
        info!(
            "Plugin config not found at {}, using empty defaults",
            path.display()
        );
        return Ok(PluginConfig::default());
    }

    load_plugin_config_from_file(&path)
}

/// 설정 로드 (실패 시 기본값으로 대체)
pub fn load_plugin_config_or_default(explicit: Option<&Path>) -> PluginConfig {
    match load_plugin_config(explicit) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load plugin config, falling back to defaults: {}", e);
            PluginConfig::default()
        }
    }
}

/// 파일에서 설정 로드 + 환경변수 확장
pub fn load_plugin_config_from_file(path: &Path) -> Result<PluginConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut config = parse_plugin_config(&content)
        .map_err(|e| Error::config_parse(path.display().to_string(), e))?;

    expand_plugin_config(&mut config);

    debug!(
        "Loaded plugin config from {}: {} channels, {} middlewares, {} relay hooks",
        path.display(),
        config.channels.len(),
        config.middlewares.len(),
        config.hooks.relay.len()
    );

    Ok(config)
}

/// YAML 문자열 파싱 (빈 문서는 기본값)
fn parse_plugin_config(content: &str) -> std::result::Result<PluginConfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(PluginConfig::default());
    }
    serde_yaml::from_str(content)
}

/// 설정 저장
///
/// 상위 디렉토리가 없으면 생성 (0755), 파일 권한 0644
pub fn save_plugin_config(config: &PluginConfig, path: &Path) -> Result<()> {
    let io_err = |source: std::io::Error| Error::ConfigIo {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
            set_mode(parent, 0o755).map_err(io_err)?;
        }
    }

    let content = serde_yaml::to_string(config)
        .map_err(|e| Error::config_parse(path.display().to_string(), e))?;

    std::fs::write(path, content).map_err(io_err)?;
    set_mode(path, 0o644).map_err(io_err)?;

    info!("Saved plugin config to {}", path.display());
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::HookPluginConfig;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_explicit_path_wins() {
        let path = resolve_config_path(Some(Path::new("/etc/relay/plugins.yaml")));
        assert_eq!(path, PathBuf::from("/etc/relay/plugins.yaml"));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let dir = tempdir().unwrap();
        let config = load_plugin_config(Some(&dir.path().join("absent.yaml"))).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_load_expands_env() {
        std::env::set_var("RELAYHOOK_LOADER_TEST_KEY", "sk-loader");

        let dir = tempdir().unwrap();
        let file = dir.path().join("plugins.yaml");
        fs::write(
            &file,
            r#"
hooks:
  relay:
    - name: web_search
      priority: 90
      config:
        api_key: ${RELAYHOOK_LOADER_TEST_KEY}
        max_results: 3
"#,
        )
        .unwrap();

        let config = load_plugin_config(Some(&file)).unwrap();
        let hook = config.relay_hook("web_search").unwrap();
        assert_eq!(hook.get_str("api_key"), Some("sk-loader"));
        assert_eq!(hook.config["max_results"], json!(3));

        std::env::remove_var("RELAYHOOK_LOADER_TEST_KEY");
    }

    #[test]
    fn test_parse_error_and_fallback() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("broken.yaml");
        fs::write(&file, "hooks: [not: a: map").unwrap();

        let err = load_plugin_config(Some(&file)).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));

        let config = load_plugin_config_or_default(Some(&file));
        assert!(config.is_empty());
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("empty.yaml");
        fs::write(&file, "\n").unwrap();

        assert!(load_plugin_config(Some(&file)).unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_dirs_and_roundtrips() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join("conf").join("plugins.yaml");

        let mut config = PluginConfig::new();
        config.hooks.relay.push(
            HookPluginConfig::new("content_filter")
                .with_priority(10)
                .with_config("replacement", json!("[x]")),
        );

        save_plugin_config(&config, &file).unwrap();
        assert!(file.exists());

        let loaded = load_plugin_config(Some(&file)).unwrap();
        assert_eq!(loaded, config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&file).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[test]
    fn test_save_keeps_config_key_order() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plugins.yaml");

        let mut config = PluginConfig::new();
        config.hooks.relay.push(
            HookPluginConfig::new("web_search")
                .with_config("zeta", json!(1))
                .with_config("alpha", json!(2))
                .with_config("mid", json!(3)),
        );
        save_plugin_config(&config, &file).unwrap();

        let text = fs::read_to_string(&file).unwrap();
        let zeta = text.find("zeta:").unwrap();
        let alpha = text.find("alpha:").unwrap();
        let mid = text.find("mid:").unwrap();
        assert!(zeta < alpha && alpha < mid, "{}", text);

        let loaded = load_plugin_config(Some(&file)).unwrap();
        let keys: Vec<&str> = loaded.hooks.relay[0].config.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
