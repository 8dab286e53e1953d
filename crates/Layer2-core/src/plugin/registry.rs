//! Plugin Registries - 채널 / 태스크 채널 / 미들웨어 카탈로그
//!
//! 세 레지스트리 모두 같은 구조: 등록 순서 벡터 + 키 인덱스, 각자의
//! `parking_lot::RwLock`. 락은 연산 동안만 잡는다.

use super::traits::{ChannelPlugin, Middleware, TaskChannelPlugin};
use parking_lot::RwLock;
use relayhook_foundation::{Error, Result};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Catalog - 공통 저장소
// ============================================================================

struct Catalog<K, T: ?Sized> {
    entries: Vec<(K, Arc<T>)>,
    index: HashMap<K, usize>,
}

impl<K, T: ?Sized> Default for Catalog<K, T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, T: ?Sized> Catalog<K, T> {
    /// 키가 이미 있으면 false
    fn insert(&mut self, key: K, item: Arc<T>) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, item));
        true
    }

    fn get(&self, key: &K) -> Option<Arc<T>> {
        self.index.get(key).map(|&i| self.entries[i].1.clone())
    }

    fn values(&self) -> Vec<Arc<T>> {
        self.entries.iter().map(|(_, item)| item.clone()).collect()
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// ChannelRegistry
// ============================================================================

/// 채널 타입 → 채널 플러그인
#[derive(Default)]
pub struct ChannelRegistry {
    inner: RwLock<Catalog<i32, dyn ChannelPlugin>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 같은 채널 타입이 있으면 DuplicateType
    pub fn register(&self, plugin: Arc<dyn ChannelPlugin>) -> Result<()> {
        let channel_type = plugin.channel_type();
        let name = plugin.metadata().name;

        if !self.inner.write().insert(channel_type, plugin) {
            return Err(Error::DuplicateType(channel_type));
        }
        info!("Registered channel plugin: {} (type {})", name, channel_type);
        Ok(())
    }

    pub fn get(&self, channel_type: i32) -> Result<Arc<dyn ChannelPlugin>> {
        self.inner
            .read()
            .get(&channel_type)
            .ok_or_else(|| Error::NotFound(format!("channel type {}", channel_type)))
    }

    pub fn list(&self) -> Vec<Arc<dyn ChannelPlugin>> {
        self.inner.read().values()
    }

    pub fn has(&self, channel_type: i32) -> bool {
        self.inner.read().contains(&channel_type)
    }

    pub fn count(&self) -> usize {
        self.inner.read().len()
    }
}

// ============================================================================
// TaskChannelRegistry
// ============================================================================

/// 플랫폼 이름 → 태스크 채널 플러그인
#[derive(Default)]
pub struct TaskChannelRegistry {
    inner: RwLock<Catalog<String, dyn TaskChannelPlugin>>,
}

impl TaskChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, plugin: Arc<dyn TaskChannelPlugin>) -> Result<()> {
        let platform = plugin.platform().to_string();

        if !self.inner.write().insert(platform.clone(), plugin) {
            return Err(Error::DuplicateName(platform));
        }
        info!("Registered task channel plugin: {}", platform);
        Ok(())
    }

    pub fn get(&self, platform: &str) -> Result<Arc<dyn TaskChannelPlugin>> {
        self.inner
            .read()
            .get(&platform.to_string())
            .ok_or_else(|| Error::NotFound(format!("task platform '{}'", platform)))
    }

    pub fn list(&self) -> Vec<Arc<dyn TaskChannelPlugin>> {
        self.inner.read().values()
    }

    pub fn has(&self, platform: &str) -> bool {
        self.inner.read().contains(&platform.to_string())
    }

    pub fn count(&self) -> usize {
        self.inner.read().len()
    }
}

// ============================================================================
// MiddlewareRegistry
// ============================================================================

/// 이름 → 미들웨어 (목록은 우선순위 내림차순)
#[derive(Default)]
pub struct MiddlewareRegistry {
    inner: RwLock<Catalog<String, dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, middleware: Arc<dyn Middleware>) -> Result<()> {
        let name = middleware.name().to_string();
        let priority = middleware.priority();

        if !self.inner.write().insert(name.clone(), middleware) {
            return Err(Error::DuplicateName(name));
        }
        info!("Registered middleware: {} (priority {})", name, priority);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Middleware>> {
        self.inner
            .read()
            .get(&name.to_string())
            .ok_or_else(|| Error::NotFound(format!("middleware '{}'", name)))
    }

    /// 우선순위 내림차순 (동순위는 등록 순)
    pub fn list(&self) -> Vec<Arc<dyn Middleware>> {
        let mut items = self.inner.read().values();
        items.sort_by_key(|m| Reverse(m.priority()));
        items
    }

    /// 활성화된 미들웨어만
    pub fn list_enabled(&self) -> Vec<Arc<dyn Middleware>> {
        self.list().into_iter().filter(|m| m.enabled()).collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.read().contains(&name.to_string())
    }

    pub fn count(&self) -> usize {
        self.inner.read().len()
    }
}
