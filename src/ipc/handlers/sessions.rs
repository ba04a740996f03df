use crate::access::{lookups, sessions};
use crate::ipc::helpers::{get_required_i64, get_required_str, label_or_null, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

fn sessions_list(conn: &Connection, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let sessions = sessions::fetch_sessions(conn)?;
    Ok(json!({ "sessions": sessions }))
}

fn sessions_create(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let label = get_required_str(params, "label")?;
    let session = sessions::add_session(conn, &label)?;
    Ok(json!({ "session": session }))
}

fn sessions_label(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_i64(params, "sessionId")?;
    label_or_null(lookups::fetch_session_label(conn, session_id))
}

fn sessions_ues(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_i64(params, "sessionId")?;
    let ues = sessions::fetch_session_ues(conn, session_id)?;
    Ok(json!({ "ues": ues }))
}

fn sessions_add_ue(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_i64(params, "sessionId")?;
    let ue = get_required_str(params, "ue")?;
    let compo = sessions::add_ue_to_session(conn, session_id, &ue)?;
    Ok(json!({ "sessionCompo": compo }))
}

fn ues_list(conn: &Connection, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ues = sessions::fetch_all_ues(conn)?;
    Ok(json!({ "ues": ues }))
}

fn ues_label(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ue = get_required_str(params, "ue")?;
    label_or_null(lookups::fetch_ue_label(conn, &ue))
}

fn session_compo_id(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_i64(params, "sessionId")?;
    let ue = get_required_str(params, "ue")?;
    let id = lookups::fetch_session_compo_id(conn, &ue, session_id)?;
    Ok(json!({ "sessionCompoId": id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "sessions.list" => Some(with_store(state, req, sessions_list)),
        "sessions.create" => Some(with_store(state, req, sessions_create)),
        "sessions.label" => Some(with_store(state, req, sessions_label)),
        "sessions.ues" => Some(with_store(state, req, sessions_ues)),
        "sessions.addUe" => Some(with_store(state, req, sessions_add_ue)),
        "ues.list" => Some(with_store(state, req, ues_list)),
        "ues.label" => Some(with_store(state, req, ues_label)),
        "sessionCompo.id" => Some(with_store(state, req, session_compo_id)),
        _ => None,
    }
}
