//! Hook Registry - 프로세스 내 hook 목록
//!
//! 삽입 순서 벡터 + 이름 인덱스. 정렬은 변경 후 첫 조회 때까지 미룬다.
//! 락은 레지스트리 연산 동안만 잡고 hook 실행 중에는 잡지 않는다.

use super::traits::{HookCapability, RelayHook};
use parking_lot::RwLock;
use relayhook_foundation::{Error, Result};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// HookDescriptor - 등록 레코드
// ============================================================================

/// hook 등록 정보
#[derive(Clone)]
pub struct HookDescriptor {
    /// 고유 이름
    pub name: String,

    /// 우선순위 (클수록 먼저)
    pub priority: i32,

    /// 활성화 여부 (목록 조회 시점에 읽힘)
    pub enabled: bool,

    /// hook 인스턴스
    pub hook: Arc<dyn RelayHook>,
}

impl HookDescriptor {
    /// hook 자체 메타데이터로 생성
    pub fn new(hook: Arc<dyn RelayHook>) -> Self {
        Self {
            name: hook.name().to_string(),
            priority: hook.priority(),
            enabled: hook.enabled(),
            hook,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn capabilities(&self) -> Vec<HookCapability> {
        self.hook.capabilities()
    }
}

impl std::fmt::Debug for HookDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookDescriptor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

// ============================================================================
// HookRegistry
// ============================================================================

#[derive(Default)]
struct RegistryInner {
    /// 삽입 순서
    entries: Vec<HookDescriptor>,

    /// 이름 -> entries 인덱스
    index: HashMap<String, usize>,

    /// 우선순위 정렬된 인덱스 (None이면 정렬 필요)
    order: Option<Vec<usize>>,
}

impl RegistryInner {
    fn sorted_order(&mut self) -> &[usize] {
        let entries = &self.entries;
        self.order.get_or_insert_with(|| {
            let mut order: Vec<usize> = (0..entries.len()).collect();
            // stable sort: 같은 우선순위는 등록 순서
            order.sort_by_key(|&i| Reverse(entries[i].priority));
            order
        })
    }
}

/// Hook 레지스트리
#[derive(Default)]
pub struct HookRegistry {
    inner: RwLock<RegistryInner>,
}

impl HookRegistry {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// hook 등록 (이름 중복 시 DuplicateName)
    pub fn register(&self, descriptor: HookDescriptor) -> Result<()> {
        let mut inner = self.inner.write();

        if inner.index.contains_key(&descriptor.name) {
            return Err(Error::DuplicateName(descriptor.name));
        }

        info!(
            "Registered hook: {} (priority {}, enabled {})",
            descriptor.name, descriptor.priority, descriptor.enabled
        );

        let position = inner.entries.len();
        inner.index.insert(descriptor.name.clone(), position);
        inner.entries.push(descriptor);
        inner.order = None;
        Ok(())
    }

    /// hook 인스턴스를 자체 메타데이터로 등록
    pub fn register_hook(&self, hook: Arc<dyn RelayHook>) -> Result<()> {
        self.register(HookDescriptor::new(hook))
    }

    /// 이름으로 조회
    pub fn get(&self, name: &str) -> Result<HookDescriptor> {
        let inner = self.inner.read();
        inner
            .index
            .get(name)
            .map(|&i| inner.entries[i].clone())
            .ok_or_else(|| Error::NotFound(format!("hook '{}'", name)))
    }

    /// 활성화된 hook (우선순위 내림차순, 동순위는 등록 순)
    pub fn list_enabled(&self) -> Vec<HookDescriptor> {
        {
            let inner = self.inner.read();
            if let Some(order) = &inner.order {
                return collect_enabled(&inner.entries, order);
            }
        }

        let mut inner = self.inner.write();
        let order = inner.sorted_order().to_vec();
        debug!("Sorted hook registry ({} entries)", order.len());
        collect_enabled(&inner.entries, &order)
    }

    /// 전체 hook (등록 순)
    pub fn list_all(&self) -> Vec<HookDescriptor> {
        self.inner.read().entries.clone()
    }

    /// 활성화 상태 변경 (이미 로드된 체인 스냅샷에는 영향 없음)
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut inner = self.inner.write();
        let i = *inner
            .index
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("hook '{}'", name)))?;
        inner.entries[i].enabled = enabled;
        debug!("Set hook {} enabled = {}", name, enabled);
        Ok(())
    }

    /// 우선순위 변경
    pub fn set_priority(&self, name: &str, priority: i32) -> Result<()> {
        let mut inner = self.inner.write();
        let i = *inner
            .index
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("hook '{}'", name)))?;
        if inner.entries[i].priority != priority {
            inner.entries[i].priority = priority;
            inner.order = None;
        }
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.read().index.contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.inner.read().entries.iter().filter(|d| d.enabled).count()
    }
}

fn collect_enabled(entries: &[HookDescriptor], order: &[usize]) -> Vec<HookDescriptor> {
    order
        .iter()
        .map(|&i| &entries[i])
        .filter(|d| d.enabled)
        .cloned()
        .collect()
}
