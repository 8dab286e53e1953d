//! 환경변수 확장
//!
//! - `$VAR`, `${VAR}`: 환경변수 값 (없으면 빈 문자열)
//! - `${VAR:-default}`: 환경변수가 없거나 비어있으면 기본값
//!
//! `config` 맵의 최상위 문자열 값만 확장한다. 중첩된 값은 다시 디스크에
//! 저장될 수 있는 사용자 데이터이므로 `$` 리터럴을 그대로 둔다.

use super::types::{ConfigMap, PluginConfig};
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

static ENV_PATTERN: OnceLock<Regex> = OnceLock::new();

fn env_pattern() -> &'static Regex {
    ENV_PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}:]+):-([^}]*)\}|\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("env pattern is a valid regex")
    })
}

/// 문자열 내 환경변수 참조 확장
pub fn expand_env(value: &str) -> String {
    expand_with(value, |name| std::env::var(name).ok())
}

/// 조회 함수를 주입받아 확장 (테스트/커스텀 소스용)
pub fn expand_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !value.contains('$') {
        return value.to_string();
    }

    env_pattern()
        .replace_all(value, |caps: &Captures| {
            if let (Some(name), Some(default)) = (caps.get(1), caps.get(2)) {
                return lookup(name.as_str())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| default.as_str().to_string());
            }
            let name = caps.get(3).or_else(|| caps.get(4)).map(|m| m.as_str());
            name.and_then(&lookup).unwrap_or_default()
        })
        .into_owned()
}

/// config 맵의 문자열 값 확장 (비문자열 값은 그대로)
pub fn expand_config_map(map: &mut ConfigMap) {
    for value in map.values_mut() {
        if let Value::String(s) = value {
            *s = expand_env(s);
        }
    }
}

/// hooks/middlewares 섹션의 config 맵 확장
pub fn expand_plugin_config(config: &mut PluginConfig) {
    for hook in &mut config.hooks.relay {
        expand_config_map(&mut hook.config);
    }
    for middleware in &mut config.middlewares {
        expand_config_map(&mut middleware.config);
    }
}
