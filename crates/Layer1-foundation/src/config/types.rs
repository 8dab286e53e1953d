//! Plugin Config 타입 정의
//!
//! `plugins.yaml`의 구조를 그대로 옮긴 설정 트리

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::Map;
use std::collections::BTreeMap;

/// hook/middleware/channel 별 자유 형식 설정 (파일에 적힌 키 순서 유지)
pub type ConfigMap = Map<String, Value>;

// ============================================================================
// PluginConfig - 최상위 설정
// ============================================================================

/// 플러그인 설정 트리
///
/// ```text
/// channels:     이름 -> { enabled, priority, config }
/// middlewares:  [{ name, enabled, priority, config }]
/// hooks:
///   relay:      [{ name, enabled, priority, config }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// 채널 플러그인 설정
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelPluginConfig>,

    /// 미들웨어 설정 (순서 유지)
    #[serde(default)]
    pub middlewares: Vec<MiddlewarePluginConfig>,

    /// 서브시스템별 hook 설정
    #[serde(default)]
    pub hooks: HooksConfig,
}

impl PluginConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정이 하나도 없는지 확인
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.middlewares.is_empty() && self.hooks.relay.is_empty()
    }

    /// relay hook 설정 조회
    pub fn relay_hook(&self, name: &str) -> Option<&HookPluginConfig> {
        self.hooks.relay.iter().find(|h| h.name == name)
    }

    /// 미들웨어 설정 조회
    pub fn middleware(&self, name: &str) -> Option<&MiddlewarePluginConfig> {
        self.middlewares.iter().find(|m| m.name == name)
    }

    /// 채널 설정 조회
    pub fn channel(&self, name: &str) -> Option<&ChannelPluginConfig> {
        self.channels.get(name)
    }
}

// ============================================================================
// 섹션별 설정
// ============================================================================

/// 채널 플러그인 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPluginConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: ConfigMap,
}

impl Default for ChannelPluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: 0,
            config: ConfigMap::new(),
        }
    }
}

/// 미들웨어 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiddlewarePluginConfig {
    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: ConfigMap,
}

/// hook 그룹 (서브시스템별)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HooksConfig {
    /// relay 요청에 붙는 hook들
    #[serde(default)]
    pub relay: Vec<HookPluginConfig>,
}

/// 단일 hook 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookPluginConfig {
    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 없으면 hook 기본 우선순위 사용
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: ConfigMap,
}

impl HookPluginConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            priority: None,
            config: ConfigMap::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// 문자열 설정값
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_tree() {
        let yaml = r#"
channels:
  openai:
    enabled: true
    priority: 10
    config:
      base_url: https://api.openai.com
middlewares:
  - name: rate_limit
    priority: 5
    config:
      rpm: 60
hooks:
  relay:
    - name: web_search
      enabled: false
      priority: 100
      config:
        provider: tavily
    - name: content_filter
"#;
        let config: PluginConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.channels["openai"].priority, 10);
        assert_eq!(config.middlewares[0].name, "rate_limit");
        assert!(config.middlewares[0].enabled);
        assert_eq!(config.middlewares[0].config["rpm"], serde_json::json!(60));

        let web = config.relay_hook("web_search").unwrap();
        assert!(!web.enabled);
        assert_eq!(web.priority, Some(100));
        assert_eq!(web.get_str("provider"), Some("tavily"));

        let filter = config.relay_hook("content_filter").unwrap();
        assert!(filter.enabled);
        assert_eq!(filter.priority, None);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config: PluginConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.is_empty());
        assert_eq!(config, PluginConfig::default());
    }
}
