use crate::access::{presence, rooms};
use crate::ipc::helpers::{get_required_i64, get_required_str, get_room_key, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

fn rooms_available(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let event_id = get_required_i64(params, "eventId")?;
    let rooms = rooms::fetch_available_event_rooms(conn, event_id)?;
    Ok(json!({ "rooms": rooms }))
}

fn rooms_assign(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let event_id = get_required_i64(params, "eventId")?;
    let room_label = get_required_str(params, "roomLabel")?;
    let assignment = rooms::assign_room_to_event(conn, event_id, &room_label)?;
    Ok(json!({ "examinationRoom": assignment }))
}

fn rooms_for_event(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let event_id = get_required_i64(params, "eventId")?;
    let rooms = rooms::fetch_rooms_for_event(conn, event_id)?;
    Ok(json!({ "rooms": rooms }))
}

fn rooms_supervisor_get(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let key = get_room_key(params)?;
    let acro = presence::fetch_room_supervisor(conn, &key)?;
    Ok(json!({ "supervisor": acro }))
}

fn rooms_supervisor_set(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let key = get_room_key(params)?;
    let acro = get_required_str(params, "teacherAcro")?;
    presence::update_supervisor(conn, &key, &acro)?;
    Ok(json!({ "supervisor": acro }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "rooms.available" => Some(with_store(state, req, rooms_available)),
        "rooms.assign" => Some(with_store(state, req, rooms_assign)),
        "rooms.forEvent" => Some(with_store(state, req, rooms_for_event)),
        "rooms.supervisor.get" => Some(with_store(state, req, rooms_supervisor_get)),
        "rooms.supervisor.set" => Some(with_store(state, req, rooms_supervisor_set)),
        _ => None,
    }
}
