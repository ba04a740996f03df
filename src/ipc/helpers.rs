use crate::access::models::RoomKey;
use crate::error::AccessError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;
use tracing::{error, warn};

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<AccessError> for HandlerErr {
    fn from(e: AccessError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            details: Some(json!({ "kind": e.kind() })),
        }
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

fn as_i64(v: &serde_json::Value) -> Option<i64> {
    // Route params arrive as strings.
    v.as_i64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

pub fn get_required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    let Some(v) = params.get(key) else {
        return Err(HandlerErr::bad_params(format!("missing {}", key)));
    };
    as_i64(v).ok_or_else(|| HandlerErr::bad_params(format!("{} must be an integer", key)))
}

pub fn get_optional_i64(params: &serde_json::Value, key: &str) -> Result<Option<i64>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => as_i64(v)
            .map(Some)
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be an integer", key))),
    }
}

/// `roomCode` plus an optional `eventId`.
pub fn get_room_key(params: &serde_json::Value) -> Result<RoomKey, HandlerErr> {
    let room = get_required_str(params, "roomCode")?;
    let key = RoomKey::code(room);
    Ok(match get_optional_i64(params, "eventId")? {
        Some(event) => key.in_event(event),
        None => key,
    })
}

/// Runs a store-backed handler: checks the auth gate and the open workspace,
/// and logs any failure once before turning it into an error response.
pub fn with_store<F>(state: &AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&Connection, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
{
    if state.config.auth.required && !state.identity.is_authenticated() {
        warn!(method = %req.method, "rejected: not signed in");
        return err(&req.id, "permission_denied", "sign in first", None);
    }
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => {
            match e.code {
                "db_query_failed" | "store_unavailable" => {
                    error!(method = %req.method, code = e.code, message = %e.message, "request failed")
                }
                _ => warn!(method = %req.method, code = e.code, message = %e.message, "request rejected"),
            }
            e.response(&req.id)
        }
    }
}

/// Label lookups answer `null` for a missing row instead of an error.
pub fn label_or_null(result: Result<String, AccessError>) -> Result<serde_json::Value, HandlerErr> {
    match result {
        Ok(label) => Ok(json!({ "label": label })),
        Err(AccessError::NotFound { .. }) => Ok(json!({ "label": null })),
        Err(e) => Err(e.into()),
    }
}
