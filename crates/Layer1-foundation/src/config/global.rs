//! 전역 Plugin Config 캐시
//!
//! 마지막으로 로드한 설정 트리를 보관한다. 리로드는 `Arc` 교체 한 번으로
//! 끝나므로 읽는 쪽은 이전 트리나 새 트리 중 하나만 보게 된다.

use super::loader::load_plugin_config_or_default;
use super::types::PluginConfig;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::info;

struct ConfigCache {
    /// 명시적으로 지정된 경로 (없으면 환경변수/기본 경로)
    path: Option<PathBuf>,
    current: Arc<PluginConfig>,
}

static CONFIG_CACHE: OnceLock<RwLock<ConfigCache>> = OnceLock::new();

fn cache() -> &'static RwLock<ConfigCache> {
    CONFIG_CACHE.get_or_init(|| {
        RwLock::new(ConfigCache {
            path: None,
            current: Arc::new(load_plugin_config_or_default(None)),
        })
    })
}

/// 전역 설정 가져오기 (최초 호출 시 로드)
pub fn global_config() -> Arc<PluginConfig> {
    Arc::clone(&cache().read().current)
}

/// 전역 설정을 특정 경로로 초기화
pub fn init_global_config(path: Option<&Path>) -> Arc<PluginConfig> {
    let loaded = Arc::new(load_plugin_config_or_default(path));
    let mut guard = cache().write();
    guard.path = path.map(Path::to_path_buf);
    guard.current = Arc::clone(&loaded);
    loaded
}

/// 전역 설정 다시 읽기
pub fn reload_global_config() -> Arc<PluginConfig> {
    let path = cache().read().path.clone();
    // 파일 IO는 락 밖에서
    let loaded = Arc::new(load_plugin_config_or_default(path.as_deref()));
    cache().write().current = Arc::clone(&loaded);
    info!(
        "Reloaded plugin config: {} relay hooks, {} middlewares",
        loaded.hooks.relay.len(),
        loaded.middlewares.len()
    );
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    // 전역 상태를 쓰는 유일한 테스트
    #[test]
    fn test_global_config_lifecycle() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plugins.yaml");
        fs::write(&file, "hooks:\n  relay:\n    - name: a\n").unwrap();

        let first = init_global_config(Some(&file));
        assert_eq!(first.hooks.relay.len(), 1);
        assert_eq!(global_config().hooks.relay.len(), 1);

        fs::write(&file, "hooks:\n  relay:\n    - name: a\n    - name: b\n").unwrap();
        let reloaded = reload_global_config();
        assert_eq!(reloaded.hooks.relay.len(), 2);

        // 이전 스냅샷은 그대로
        assert_eq!(first.hooks.relay.len(), 1);
        assert_eq!(global_config().hooks.relay.len(), 2);
    }
}
