//! `relayhook simulate` - 녹화된 업스트림 응답으로 파이프라인 실행

use crate::hooks_cmd::build_registry;
use anyhow::Context;
use async_trait::async_trait;
use relayhook_core::{
    build_hook_context, keys, HookChain, HookContext, RelayPipeline, RequestContext,
    RequestInfo, ResponseInfo, Result, Upstream, UpstreamResponse,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct SimulateOptions {
    pub request: PathBuf,
    pub response: PathBuf,
    pub url_path: String,
    pub status: u16,
    pub stream: bool,
    pub config: Option<PathBuf>,
}

/// 파일에서 읽은 응답을 그대로 돌려주는 업스트림
struct RecordedUpstream {
    response: UpstreamResponse,
}

#[async_trait]
impl Upstream for RecordedUpstream {
    async fn dispatch(&self, ctx: &HookContext) -> Result<UpstreamResponse> {
        debug!(bytes = ctx.request_body().len(), "Dispatching to recorded upstream");
        Ok(self.response.clone())
    }
}

pub async fn run(options: SimulateOptions) -> anyhow::Result<()> {
    let request_body = std::fs::read(&options.request)
        .with_context(|| format!("failed to read {}", options.request.display()))?;
    let response_body = std::fs::read(&options.response)
        .with_context(|| format!("failed to read {}", options.response.display()))?;

    let content_type = if options.stream {
        "text/event-stream"
    } else {
        "application/json"
    };
    let upstream = RecordedUpstream {
        response: UpstreamResponse::new(
            ResponseInfo::new(options.status).with_header("content-type", content_type),
            response_body,
        ),
    };

    let registry = Arc::new(build_registry(options.config.as_deref())?);
    let pipeline = RelayPipeline::new(Arc::new(HookChain::loaded(registry)));

    let token = CancellationToken::new();
    let ctrl_c = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling simulation");
                token.cancel();
            }
        })
    };

    let mut ctx = build_hook_context(
        &ambient_from_request(&request_body).with_cancellation(token),
        RequestInfo::new("POST", &options.url_path).with_header("content-type", "application/json"),
    );

    let outcome = pipeline.relay(&mut ctx, request_body, &upstream).await;
    ctrl_c.abort();
    outcome?;

    println!("=== request (after pre_request) ===");
    println!("{}", render(ctx.request_body()));
    println!();
    println!("=== response (after post_response) ===");
    println!("{}", render(ctx.response_body().unwrap_or_default()));

    if !ctx.data().is_empty() {
        println!();
        println!("=== scratch ===");
        let mut entries: Vec<_> = ctx.data().iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}

/// 요청 바디의 `model` 을 ambient 키로 옮긴다 (미들웨어가 하던 일)
fn ambient_from_request(body: &[u8]) -> RequestContext {
    let model = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("model").and_then(Value::as_str).map(str::to_string));

    match model {
        Some(model) => RequestContext::new().with_value(keys::ORIGINAL_MODEL, model),
        None => RequestContext::new(),
    }
}

/// JSON 이면 pretty print, 아니면 텍스트 그대로
fn render(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambient_from_request() {
        let ctx = ambient_from_request(br#"{"model":"gpt-4o-mini","messages":[]}"#);
        assert_eq!(ctx.get_string(keys::ORIGINAL_MODEL), "gpt-4o-mini");
        assert_eq!(ambient_from_request(b"not json").get_string(keys::ORIGINAL_MODEL), "");
    }

    #[test]
    fn test_render() {
        assert_eq!(render(br#"{"a":1}"#), "{\n  \"a\": 1\n}");
        assert_eq!(render(b"data: [DONE]\n"), "data: [DONE]\n");
    }

    #[tokio::test]
    async fn test_run_with_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let request = dir.path().join("request.json");
        let response = dir.path().join("response.json");
        std::fs::write(&request, r#"{"model":"m","messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        std::fs::write(&response, r#"{"choices":[{"message":{"content":"hello"}}]}"#).unwrap();

        let options = SimulateOptions {
            request,
            response,
            url_path: "/v1/chat/completions".to_string(),
            status: 200,
            stream: false,
            config: Some(dir.path().join("absent.yaml")),
        };
        run(options).await.unwrap();
    }
}
