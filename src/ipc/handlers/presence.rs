use crate::access::presence;
use crate::ipc::helpers::{get_required_i64, get_required_str, get_room_key, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

fn students_list(conn: &Connection, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let students = presence::fetch_all_students(conn)?;
    Ok(json!({ "students": students }))
}

fn students_by_ue(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ue = get_required_str(params, "ue")?;
    let students = presence::fetch_students_by_ue(conn, &ue)?;
    Ok(json!({ "students": students }))
}

fn supervisors_list(conn: &Connection, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let supervisors = presence::fetch_supervisors(conn)?;
    Ok(json!({ "supervisors": supervisors }))
}

fn presence_toggle(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_i64(params, "studentId")?;
    let key = get_room_key(params)?;
    let state = presence::toggle_presence(conn, student_id, &key)?;
    Ok(json!({ "studentId": student_id, "presence": state }))
}

fn presence_by_room(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let key = get_room_key(params)?;
    let present = presence::fetch_presences_by_room(conn, &key)?;
    Ok(json!({ "present": present }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_store(state, req, students_list)),
        "students.byUe" => Some(with_store(state, req, students_by_ue)),
        "supervisors.list" => Some(with_store(state, req, supervisors_list)),
        "presence.toggle" => Some(with_store(state, req, presence_toggle)),
        "presence.byRoom" => Some(with_store(state, req, presence_by_room)),
        _ => None,
    }
}
