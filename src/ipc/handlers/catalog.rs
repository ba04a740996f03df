use crate::access::catalog;
use crate::ipc::helpers::{get_required_i64, get_required_str, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

fn rooms_create(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let label = get_required_str(params, "label")?;
    let capacity = get_required_i64(params, "capacity")?;
    let room = catalog::add_room(conn, &label, capacity)?;
    Ok(json!({ "room": room }))
}

fn teachers_create(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let acro = get_required_str(params, "acro")?;
    let names = get_required_str(params, "names")?;
    let teacher = catalog::add_teacher(conn, &acro, &names)?;
    Ok(json!({ "teacher": teacher }))
}

fn students_create(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_i64(params, "studentId")?;
    let firstname = get_required_str(params, "firstname")?;
    let lastname = get_required_str(params, "lastname")?;
    let student = catalog::add_student(conn, student_id, &firstname, &lastname)?;
    Ok(json!({ "student": student }))
}

fn ues_create(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ue = get_required_str(params, "ue")?;
    let ue = catalog::add_ue(conn, &ue)?;
    Ok(json!({ "ue": ue }))
}

fn enrollments_create(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_i64(params, "studentId")?;
    let ue = get_required_str(params, "ue")?;
    let enrollment = catalog::enroll_student(conn, student_id, &ue)?;
    Ok(json!({ "enrollment": enrollment }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "rooms.create" => Some(with_store(state, req, rooms_create)),
        "teachers.create" => Some(with_store(state, req, teachers_create)),
        "students.create" => Some(with_store(state, req, students_create)),
        "ues.create" => Some(with_store(state, req, ues_create)),
        "enrollments.create" => Some(with_store(state, req, enrollments_create)),
        _ => None,
    }
}
