use crate::ipc::error::{err, ok};
use crate::ipc::helpers::get_required_str;
use crate::ipc::types::{AppState, Request};
use crate::routes;
use serde_json::json;

fn handle_routes_list(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "routes": routes::ROUTES }))
}

fn handle_routes_resolve(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match get_required_str(&req.params, "path") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let Some(matched) = routes::resolve(&path) else {
        return err(
            &req.id,
            "not_found",
            format!("no route for {}", path),
            None,
        );
    };
    let allowed = routes::guard(matched.route, &state.identity.state());
    ok(
        &req.id,
        json!({
            "name": matched.route.name,
            "path": matched.route.path,
            "params": matched.params,
            "breadcrumb": matched.route.breadcrumb,
            "requiresAuth": matched.route.requires_auth,
            "allowed": allowed
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "routes.list" => Some(handle_routes_list(state, req)),
        "routes.resolve" => Some(handle_routes_resolve(state, req)),
        _ => None,
    }
}
