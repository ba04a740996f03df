use crate::access::{events, lookups};
use crate::ipc::helpers::{get_required_i64, get_required_str, label_or_null, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

fn events_list(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let compo_id = get_required_i64(params, "sessionCompoId")?;
    let events = events::fetch_ue_events(conn, compo_id)?;
    Ok(json!({ "events": events }))
}

fn events_create(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let compo_id = get_required_i64(params, "sessionCompoId")?;
    let label = get_required_str(params, "label")?;
    let event = events::add_event_to_session_compo(conn, compo_id, &label)?;
    Ok(json!({ "event": event }))
}

fn events_label(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let event_id = get_required_i64(params, "eventId")?;
    label_or_null(lookups::fetch_event_label(conn, event_id))
}

fn events_set_completed(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let event_id = get_required_i64(params, "eventId")?;
    let completed = params
        .get("completed")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HandlerErr::bad_params("missing completed"))?;
    events::set_event_completed(conn, event_id, completed)?;
    Ok(json!({ "eventId": event_id, "completed": completed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "events.list" => Some(with_store(state, req, events_list)),
        "events.create" => Some(with_store(state, req, events_create)),
        "events.label" => Some(with_store(state, req, events_label)),
        "events.setCompleted" => Some(with_store(state, req, events_set_completed)),
        _ => None,
    }
}
