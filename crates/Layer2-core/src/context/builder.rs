//! Context Builder - ambient 상태를 HookContext로 옮기기
//!
//! 빌더는 요청 바디를 읽지 않고 응답도 건드리지 않는다. 바디는 pre_request
//! 직전에 `attach_request_body`, 응답은 업스트림 호출 후 `attach_response`로
//! 붙인다.

use super::ambient::{keys, RequestContext, RequestInfo, ResponseInfo};
use super::hook_context::HookContext;

/// ambient 키에서 HookContext 생성 (없는 키는 0/빈 값)
pub fn build_hook_context(ambient: &RequestContext, request: RequestInfo) -> HookContext {
    let original_model = ambient.get_string(keys::ORIGINAL_MODEL);
    let model_name = match ambient.get_string(keys::MODEL_NAME) {
        name if name.is_empty() => original_model.clone(),
        name => name,
    };

    let mut ctx = HookContext::new(ambient.clone(), request);

    ctx.channel_id = ambient.get_i64(keys::CHANNEL_ID);
    ctx.channel_type = i32::try_from(ambient.get_i64(keys::CHANNEL_TYPE)).unwrap_or_default();
    ctx.channel_name = ambient.get_string(keys::CHANNEL_NAME);

    ctx.model_name = model_name;
    ctx.original_model = original_model;

    ctx.user_id = ambient.get_i64(keys::USER_ID);
    ctx.token_id = ambient.get_i64(keys::TOKEN_ID);
    ctx.group = ambient.get_string(keys::GROUP);

    ctx
}

/// 요청 바디 부착 (pre_request 전)
pub fn attach_request_body(ctx: &mut HookContext, body: Vec<u8>) {
    ctx.set_request_body(body);
}

/// 업스트림 응답 부착 (post_response 전)
pub fn attach_response(ctx: &mut HookContext, body: Vec<u8>, response: ResponseInfo) {
    ctx.response = Some(response);
    ctx.set_response_body(body);
}
