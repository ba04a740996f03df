use crate::auth::{IdentityState, OAuthRequest};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::get_required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn identity_json(state: &IdentityState) -> serde_json::Value {
    json!({ "identity": state })
}

fn handle_auth_init(state: &mut AppState, req: &Request) -> serde_json::Value {
    let url = match get_required_str(&req.params, "url") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let identity = state.identity.init(state.auth.as_ref(), &url);
    ok(&req.id, identity_json(&identity))
}

fn handle_auth_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let redirect_to = req
        .params
        .get("redirectTo")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| state.config.auth.redirect_to.clone());
    let request = OAuthRequest {
        provider: state.config.auth.provider.clone(),
        redirect_to,
    };
    match state.identity.login(state.auth.as_ref(), &request) {
        Ok(url) => ok(&req.id, json!({ "url": url })),
        Err(e) => err(&req.id, "auth_failed", e.to_string(), None),
    }
}

fn handle_auth_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let navigate_to = state.identity.logout(state.auth.as_ref());
    ok(&req.id, json!({ "navigateTo": navigate_to }))
}

fn handle_auth_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, identity_json(&state.identity.state()))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.init" => Some(handle_auth_init(state, req)),
        "auth.login" => Some(handle_auth_login(state, req)),
        "auth.logout" => Some(handle_auth_logout(state, req)),
        "auth.state" => Some(handle_auth_state(state, req)),
        _ => None,
    }
}
