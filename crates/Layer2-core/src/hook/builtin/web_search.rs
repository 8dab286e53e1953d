//! Web Search Hook
//!
//! 마지막 메시지에 `[search]` / `[web]` / `[联网]` 마커가 있으면 검색을 수행하고
//! 결과를 system 메시지로 주입한다. 검색 실패는 로그만 남기고 요청을 그대로
//! 통과시킨다.

use super::{is_truthy, process_env, EnvLookup, DEFAULT_BUILTIN_PRIORITY};
use crate::context::{scratch, HookContext};
use crate::hook::traits::{RelayHook, RequestModifier};
use async_trait::async_trait;
use relayhook_foundation::{Error, HookPluginConfig, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 등록 이름
pub const WEB_SEARCH_HOOK_NAME: &str = "web_search";

/// 검색을 트리거하는 마커
pub const SEARCH_MARKERS: [&str; 3] = ["[search]", "[web]", "[联网]"];

const DEFAULT_MAX_RESULTS: usize = 5;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Configuration
// ============================================================================

/// 검색 제공자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchProvider {
    /// Tavily AI Search
    #[default]
    Tavily,
    /// Brave Search API
    Brave,
    /// DuckDuckGo instant answer (API 키 불필요)
    DuckDuckGo,
}

impl SearchProvider {
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::DuckDuckGo)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tavily => "tavily",
            Self::Brave => "brave",
            Self::DuckDuckGo => "duckduckgo",
        }
    }
}

impl FromStr for SearchProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tavily" => Ok(Self::Tavily),
            "brave" => Ok(Self::Brave),
            "duckduckgo" | "ddg" => Ok(Self::DuckDuckGo),
            other => Err(Error::InvalidInput(format!("unknown search provider '{}'", other))),
        }
    }
}

impl std::fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Web search hook 설정
#[derive(Debug, Clone)]
pub struct WebSearchConfig {
    pub enabled: bool,
    pub provider: SearchProvider,
    pub api_key: Option<String>,
    pub max_results: usize,
    pub timeout: Duration,
    pub priority: i32,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: SearchProvider::default(),
            api_key: None,
            max_results: DEFAULT_MAX_RESULTS,
            timeout: DEFAULT_TIMEOUT,
            priority: DEFAULT_BUILTIN_PRIORITY,
        }
    }
}

impl WebSearchConfig {
    /// 프로세스 환경변수만으로 구성
    pub fn from_env() -> Self {
        Self::resolve(None, &process_env)
    }

    /// 환경변수 + `hooks.relay` 항목으로 구성
    ///
    /// 설정 항목이 있으면 그 `enabled`가 `WEB_SEARCH_ENABLED`보다 우선한다.
    pub fn resolve(entry: Option<&HookPluginConfig>, env: EnvLookup<'_>) -> Self {
        let mut config = Self {
            enabled: is_truthy(env("WEB_SEARCH_ENABLED").as_deref()),
            api_key: env("WEB_SEARCH_API_KEY").filter(|k| !k.trim().is_empty()),
            ..Self::default()
        };

        if let Some(name) = env("WEB_SEARCH_PROVIDER") {
            config.set_provider(&name);
        }
        if let Some(n) = env("WEB_SEARCH_MAX_RESULTS").and_then(|v| v.trim().parse().ok()) {
            config.set_max_results(n);
        }

        if let Some(entry) = entry {
            config.apply_entry(entry);
        }
        config
    }

    fn apply_entry(&mut self, entry: &HookPluginConfig) {
        self.enabled = entry.enabled;
        if let Some(priority) = entry.priority {
            self.priority = priority;
        }
        if let Some(key) = entry.get_str("api_key").filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.to_string());
        }
        if let Some(name) = entry.get_str("provider") {
            self.set_provider(name);
        }
        if let Some(n) = entry.config.get("max_results").and_then(value_as_u64) {
            self.set_max_results(n as usize);
        }
        if let Some(secs) = entry.config.get("timeout_secs").and_then(value_as_u64) {
            self.timeout = Duration::from_secs(secs);
        }
    }

    fn set_provider(&mut self, name: &str) {
        match name.parse() {
            Ok(provider) => self.provider = provider,
            Err(e) => warn!("{}; keeping {}", e, self.provider),
        }
    }

    fn set_max_results(&mut self, n: usize) {
        if n > 0 {
            self.max_results = n;
        }
    }

    /// 활성화 + (필요한 경우) API 키 존재
    pub fn is_usable(&self) -> bool {
        self.enabled && (!self.provider.requires_api_key() || self.api_key.is_some())
    }
}

/// 숫자 또는 숫자 문자열 (환경변수 확장 후에는 문자열일 수 있음)
fn value_as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

// ============================================================================
// Search Backend
// ============================================================================

/// 검색 결과 한 건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
    pub source: String,
}

/// 검색 백엔드
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

/// reqwest 기반 HTTP 검색 백엔드
pub struct HttpSearchBackend {
    provider: SearchProvider,
    api_key: Option<String>,
    client: Client,
}

impl HttpSearchBackend {
    pub fn new(config: &WebSearchConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("RelayHook/0.1")
            .build()
            .unwrap_or_default();

        Self {
            provider: config.provider,
            api_key: config.api_key.clone(),
            client,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::InvalidInput(format!("{} API key not set", self.provider)))
    }

    async fn search_tavily(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .post("https://api.tavily.com/search")
            .json(&json!({
                "api_key": self.api_key()?,
                "query": query,
                "max_results": max_results,
            }))
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let data = read_json(response, "Tavily").await?;
        Ok(parse_tavily_results(&data, max_results))
    }

    async fn search_brave(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let url = format!(
            "https://api.search.brave.com/res/v1/web/search?q={}&count={}",
            urlencoding::encode(query),
            max_results
        );

        let response = self
            .client
            .get(&url)
            .header("X-Subscription-Token", self.api_key()?)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let data = read_json(response, "Brave").await?;
        Ok(parse_brave_results(&data, max_results))
    }

    async fn search_duckduckgo(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let url = format!(
            "https://api.duckduckgo.com/?q={}&format=json&no_html=1&skip_disambig=1",
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let data = read_json(response, "DuckDuckGo").await?;
        Ok(parse_duckduckgo_results(&data, max_results))
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    fn provider_name(&self) -> &str {
        self.provider.as_str()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        match self.provider {
            SearchProvider::Tavily => self.search_tavily(query, max_results).await,
            SearchProvider::Brave => self.search_brave(query, max_results).await,
            SearchProvider::DuckDuckGo => self.search_duckduckgo(query, max_results).await,
        }
    }
}

async fn read_json(response: reqwest::Response, provider: &str) -> Result<Value> {
    if !response.status().is_success() {
        return Err(Error::Http(format!(
            "{} API error: {}",
            provider,
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| Error::Http(format!("{} returned invalid JSON: {}", provider, e)))
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

fn parse_tavily_results(data: &Value, max_results: usize) -> Vec<SearchResult> {
    let Some(items) = data["results"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .take(max_results)
        .map(|item| {
            let url = item["url"].as_str().unwrap_or_default();
            SearchResult {
                title: item["title"].as_str().unwrap_or_default().to_string(),
                url: url.to_string(),
                description: item["content"].as_str().unwrap_or_default().to_string(),
                source: host_of(url),
            }
        })
        .collect()
}

fn parse_brave_results(data: &Value, max_results: usize) -> Vec<SearchResult> {
    let Some(items) = data["web"]["results"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let title = item["title"].as_str().unwrap_or_default();
            let url = item["url"].as_str().unwrap_or_default();
            if title.is_empty() || url.is_empty() {
                return None;
            }
            Some(SearchResult {
                title: title.to_string(),
                url: url.to_string(),
                description: item["description"].as_str().unwrap_or_default().to_string(),
                source: host_of(url),
            })
        })
        .take(max_results)
        .collect()
}

fn parse_duckduckgo_results(data: &Value, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    // Abstract (main answer)
    if let Some(abstract_text) = data["AbstractText"].as_str().filter(|t| !t.is_empty()) {
        results.push(SearchResult {
            title: data["Heading"].as_str().unwrap_or("Answer").to_string(),
            url: data["AbstractURL"].as_str().unwrap_or_default().to_string(),
            description: abstract_text.to_string(),
            source: data["AbstractSource"].as_str().unwrap_or_default().to_string(),
        });
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        for topic in topics {
            if results.len() >= max_results {
                break;
            }
            if let Some(text) = topic["Text"].as_str() {
                results.push(SearchResult {
                    title: text.chars().take(100).collect(),
                    url: topic["FirstURL"].as_str().unwrap_or_default().to_string(),
                    description: text.to_string(),
                    source: "DuckDuckGo".to_string(),
                });
            }
        }
    }

    results.truncate(max_results);
    results
}

// ============================================================================
// Hook
// ============================================================================

/// 검색 결과 주입 hook
pub struct WebSearchHook {
    config: WebSearchConfig,
    backend: Arc<dyn SearchBackend>,
}

impl WebSearchHook {
    /// 설정의 제공자로 HTTP 백엔드 생성
    pub fn new(config: WebSearchConfig) -> Self {
        let backend = Arc::new(HttpSearchBackend::new(&config));
        Self { config, backend }
    }

    pub fn with_backend(config: WebSearchConfig, backend: Arc<dyn SearchBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &WebSearchConfig {
        &self.config
    }
}

#[async_trait]
impl RelayHook for WebSearchHook {
    fn name(&self) -> &str {
        WEB_SEARCH_HOOK_NAME
    }

    fn priority(&self) -> i32 {
        self.config.priority
    }

    fn enabled(&self) -> bool {
        self.config.is_usable()
    }

    async fn pre_request(&self, ctx: &mut HookContext) -> Result<()> {
        if !ctx.request.is_chat_completions() {
            return Ok(());
        }

        let body = ctx.request_body().to_vec();
        if let Some(new_body) = self.modify_request(ctx, &body).await? {
            ctx.set_request_body(new_body);
        }
        Ok(())
    }

    async fn post_response(&self, _ctx: &mut HookContext) -> Result<()> {
        Ok(())
    }

    async fn on_error(&self, _ctx: &mut HookContext, _err: &Error) -> Result<()> {
        Ok(())
    }

    fn as_request_modifier(&self) -> Option<&dyn RequestModifier> {
        Some(self)
    }
}

#[async_trait]
impl RequestModifier for WebSearchHook {
    async fn modify_request(&self, ctx: &mut HookContext, body: &[u8]) -> Result<Option<Vec<u8>>> {
        let Ok(mut payload) = serde_json::from_slice::<Value>(body) else {
            return Ok(None);
        };

        let Some(query) = payload
            .get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.last())
            .and_then(|last| last.get("content"))
            .and_then(Value::as_str)
            .and_then(extract_query)
        else {
            return Ok(None);
        };

        let token = ctx.request_ctx.cancellation_token().clone();
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(query = %query, "Web search cancelled");
                return Ok(None);
            }
            outcome = self.backend.search(&query, self.config.max_results) => outcome,
        };

        let results = match outcome {
            Ok(results) if results.is_empty() => {
                debug!(query = %query, "Web search returned no results");
                return Ok(None);
            }
            Ok(results) => results,
            Err(e) => {
                warn!(query = %query, provider = self.backend.provider_name(), error = %e, "Web search failed");
                return Ok(None);
            }
        };

        let Some(messages) = payload.get_mut("messages").and_then(Value::as_array_mut) else {
            return Ok(None);
        };

        if let Some(last) = messages.last_mut().and_then(Value::as_object_mut) {
            last.insert("content".to_string(), Value::String(query.clone()));
        }

        let leading_system = messages
            .first()
            .and_then(|m| m.get("role"))
            .and_then(Value::as_str)
            == Some("system");
        let position = usize::from(leading_system);
        messages.insert(
            position,
            json!({
                "role": "system",
                "content": format_results(&query, &results),
            }),
        );

        let new_body = serde_json::to_vec(&payload)?;
        ctx.set(scratch::WEB_SEARCH_PERFORMED, true);
        ctx.set(scratch::WEB_SEARCH_QUERY, query.as_str());

        info!(
            query = %query,
            results = results.len(),
            "Injected web search results"
        );
        Ok(Some(new_body))
    }
}

/// 마커를 제거한 검색어 (마커가 없거나 남는 글자가 없으면 None)
fn extract_query(content: &str) -> Option<String> {
    if !SEARCH_MARKERS.iter().any(|m| content.contains(m)) {
        return None;
    }

    let stripped = SEARCH_MARKERS
        .iter()
        .fold(content.to_string(), |acc, marker| acc.replace(marker, ""));
    let query = stripped.trim();

    (!query.is_empty()).then(|| query.to_string())
}

fn format_results(query: &str, results: &[SearchResult]) -> String {
    let mut output = format!("Web search results for \"{}\":\n\n", query);

    for (i, result) in results.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, result.title));
        if !result.url.is_empty() {
            output.push_str(&format!("   URL: {}\n", result.url));
        }
        if !result.description.is_empty() {
            output.push_str(&format!("   {}\n", result.description));
        }
        output.push('\n');
    }

    output.push_str("Use these results to answer the user's question and cite sources where helpful.");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RequestContext, RequestInfo};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    struct FakeBackend {
        results: Result<Vec<SearchResult>>,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn returning(results: Vec<SearchResult>) -> Arc<Self> {
            Arc::new(Self {
                results: Ok(results),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                results: Err(Error::Http("connection refused".into())),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        fn provider_name(&self) -> &str {
            "fake"
        }

        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.results {
                Ok(results) => Ok(results.clone()),
                Err(e) => Err(Error::Http(e.to_string())),
            }
        }
    }

    fn weather_result() -> SearchResult {
        SearchResult {
            title: "Forecast".to_string(),
            url: "https://weather.example.com/today".to_string(),
            description: "Sunny, high of 24C".to_string(),
            source: "weather.example.com".to_string(),
        }
    }

    fn enabled_config() -> WebSearchConfig {
        WebSearchConfig {
            enabled: true,
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    fn chat_ctx(body: Value) -> HookContext {
        let mut ctx = HookContext::new(
            RequestContext::new(),
            RequestInfo::new("POST", "/v1/chat/completions"),
        );
        ctx.set_request_body(serde_json::to_vec(&body).unwrap());
        ctx
    }

    #[tokio::test]
    async fn test_injects_results_at_head() {
        let backend = FakeBackend::returning(vec![weather_result()]);
        let hook = WebSearchHook::with_backend(enabled_config(), backend.clone());

        let mut ctx = chat_ctx(json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "Weather today [search]"}]
        }));
        hook.pre_request(&mut ctx).await.unwrap();

        let body = ctx.request_json().unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert!(messages[0]["content"]
            .as_str()
            .unwrap()
            .contains("Sunny, high of 24C"));
        assert_eq!(messages[1]["content"], "Weather today");

        assert!(ctx.get_bool(scratch::WEB_SEARCH_PERFORMED));
        assert_eq!(ctx.get_str(scratch::WEB_SEARCH_QUERY), Some("Weather today"));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_injects_after_leading_system_message() {
        let backend = FakeBackend::returning(vec![weather_result()]);
        let hook = WebSearchHook::with_backend(enabled_config(), backend);

        let mut ctx = chat_ctx(json!({
            "messages": [
                {"role": "system", "content": "You are helpful."},
                {"role": "user", "content": "[web] rust 2024 edition"}
            ]
        }));
        hook.pre_request(&mut ctx).await.unwrap();

        let body = ctx.request_json().unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["content"], "You are helpful.");
        assert_eq!(messages[1]["role"], "system");
        assert!(messages[1]["content"]
            .as_str()
            .unwrap()
            .contains("rust 2024 edition"));
        assert_eq!(messages[2]["content"], "rust 2024 edition");
    }

    #[tokio::test]
    async fn test_no_marker_leaves_body_untouched() {
        let backend = FakeBackend::returning(vec![weather_result()]);
        let hook = WebSearchHook::with_backend(enabled_config(), backend.clone());

        let mut ctx = chat_ctx(json!({"messages": [{"role": "user", "content": "hello"}]}));
        let before = ctx.request_body().to_vec();
        hook.pre_request(&mut ctx).await.unwrap();

        assert_eq!(ctx.request_body(), before.as_slice());
        assert_eq!(backend.calls(), 0);
        assert!(ctx.data().is_empty());
    }

    #[tokio::test]
    async fn test_marker_only_is_ignored() {
        let backend = FakeBackend::returning(vec![weather_result()]);
        let hook = WebSearchHook::with_backend(enabled_config(), backend.clone());

        let mut ctx = chat_ctx(json!({"messages": [{"role": "user", "content": "  [联网]  "}]}));
        hook.pre_request(&mut ctx).await.unwrap();
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_other_paths_are_ignored() {
        let backend = FakeBackend::returning(vec![weather_result()]);
        let hook = WebSearchHook::with_backend(enabled_config(), backend.clone());

        let mut ctx = HookContext::new(RequestContext::new(), RequestInfo::new("POST", "/v1/embeddings"));
        ctx.set_request_body(br#"{"messages":[{"role":"user","content":"x [search]"}]}"#.to_vec());
        hook.pre_request(&mut ctx).await.unwrap();
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_failure_is_swallowed() {
        let backend = FakeBackend::failing();
        let hook = WebSearchHook::with_backend(enabled_config(), backend.clone());

        let mut ctx = chat_ctx(json!({"messages": [{"role": "user", "content": "news [search]"}]}));
        let before = ctx.request_body().to_vec();
        hook.pre_request(&mut ctx).await.unwrap();

        assert_eq!(backend.calls(), 1);
        assert_eq!(ctx.request_body(), before.as_slice());
        assert!(!ctx.get_bool(scratch::WEB_SEARCH_PERFORMED));
    }

    #[tokio::test]
    async fn test_cancelled_request_skips_search() {
        let backend = FakeBackend::returning(vec![weather_result()]);
        let hook = WebSearchHook::with_backend(enabled_config(), backend.clone());

        let token = CancellationToken::new();
        token.cancel();
        let mut ctx = HookContext::new(
            RequestContext::new().with_cancellation(token),
            RequestInfo::new("POST", "/v1/chat/completions"),
        );
        ctx.set_request_body(br#"{"messages":[{"role":"user","content":"x [search]"}]}"#.to_vec());
        hook.pre_request(&mut ctx).await.unwrap();

        assert_eq!(backend.calls(), 0);
        assert!(!ctx.get_bool(scratch::WEB_SEARCH_PERFORMED));
    }

    #[test]
    fn test_config_env_gate() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("WEB_SEARCH_ENABLED", "true"),
            ("WEB_SEARCH_PROVIDER", "brave"),
            ("WEB_SEARCH_MAX_RESULTS", "3"),
        ]);
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());

        let config = WebSearchConfig::resolve(None, &lookup);
        assert!(config.enabled);
        assert_eq!(config.provider, SearchProvider::Brave);
        assert_eq!(config.max_results, 3);
        // brave 는 키가 필요
        assert!(!config.is_usable());
    }

    #[test]
    fn test_config_duckduckgo_needs_no_key() {
        let env: HashMap<&str, &str> =
            HashMap::from([("WEB_SEARCH_ENABLED", "1"), ("WEB_SEARCH_PROVIDER", "duckduckgo")]);
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());

        assert!(WebSearchConfig::resolve(None, &lookup).is_usable());
    }

    #[test]
    fn test_config_entry_overrides_env() {
        let lookup = |k: &str| match k {
            "WEB_SEARCH_ENABLED" => Some("false".to_string()),
            _ => None,
        };
        let entry = HookPluginConfig::new(WEB_SEARCH_HOOK_NAME)
            .with_priority(250)
            .with_config("api_key", json!("sk-live"))
            .with_config("max_results", json!("8"));

        let config = WebSearchConfig::resolve(Some(&entry), &lookup);
        assert!(config.enabled);
        assert_eq!(config.priority, 250);
        assert_eq!(config.api_key.as_deref(), Some("sk-live"));
        assert_eq!(config.max_results, 8);
        assert!(config.is_usable());
    }

    #[test]
    fn test_extract_query() {
        assert_eq!(extract_query("Weather today [search]").as_deref(), Some("Weather today"));
        assert_eq!(extract_query("[web]  a  b ").as_deref(), Some("a  b"));
        assert_eq!(extract_query("plain"), None);
        assert_eq!(extract_query("[search][web]"), None);
    }

    #[test]
    fn test_parse_provider_payloads() {
        let tavily = json!({"results": [
            {"title": "A", "url": "https://a.example.com/x", "content": "alpha"},
            {"title": "B", "url": "https://b.example.com", "content": "beta"}
        ]});
        let parsed = parse_tavily_results(&tavily, 1);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].source, "a.example.com");
        assert_eq!(parsed[0].description, "alpha");

        let brave = json!({"web": {"results": [
            {"title": "", "url": "https://skip.example.com"},
            {"title": "Kept", "url": "https://kept.example.com", "description": "d"}
        ]}});
        let parsed = parse_brave_results(&brave, 5);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "Kept");

        let ddg = json!({
            "Heading": "Rust",
            "AbstractText": "A language",
            "AbstractURL": "https://www.rust-lang.org",
            "AbstractSource": "Wikipedia",
            "RelatedTopics": [{"Text": "Cargo", "FirstURL": "https://doc.rust-lang.org/cargo"}]
        });
        let parsed = parse_duckduckgo_results(&ddg, 5);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].title, "Rust");
        assert_eq!(parsed[1].source, "DuckDuckGo");
    }
}
