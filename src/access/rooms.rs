//! Rooms offered to, and assigned to, an examination event.

use crate::access::models::{EventRoom, ExaminationRoom, Room, NO_SUPERVISOR};
use crate::error::{AccessError, AccessResult};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::debug;

fn event_exists(conn: &Connection, event_id: i64) -> AccessResult<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM event WHERE id = ?", [event_id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?
        .is_some())
}

/// Builds the room query, adding a `NOT IN` clause only for a non-empty
/// exclusion list.
fn available_rooms_sql(excluded: usize) -> String {
    let mut sql = String::from("SELECT label, capacity FROM room");
    if excluded > 0 {
        let placeholders = vec!["?"; excluded].join(", ");
        sql.push_str(&format!(" WHERE label NOT IN ({})", placeholders));
    }
    sql.push_str(" ORDER BY label ASC");
    sql
}

/// All rooms not yet assigned to `event_id`, by label ascending.
pub fn fetch_available_event_rooms(conn: &Connection, event_id: i64) -> AccessResult<Vec<Room>> {
    // One read transaction so the exclusion list and the room list agree.
    let tx = conn.unchecked_transaction()?;

    let used: Vec<String> = {
        let mut stmt = tx.prepare("SELECT room FROM examination_room WHERE event = ?")?;
        let rows = stmt.query_map([event_id], |r| r.get(0))?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    let rooms = {
        let mut stmt = tx.prepare(&available_rooms_sql(used.len()))?;
        let rows = stmt.query_map(params_from_iter(used.iter()), |r| {
            Ok(Room {
                label: r.get(0)?,
                capacity: r.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    tx.commit()?;

    debug!(event_id, excluded = used.len(), offered = rooms.len(), "available rooms");
    Ok(rooms)
}

/// Links `room_label` to `event_id` and returns the new assignment.
pub fn assign_room_to_event(
    conn: &Connection,
    event_id: i64,
    room_label: &str,
) -> AccessResult<ExaminationRoom> {
    let room_label = room_label.trim();
    if !event_exists(conn, event_id)? {
        return Err(AccessError::not_found("event"));
    }
    let room_exists = conn
        .query_row("SELECT 1 FROM room WHERE label = ?", [room_label], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?
        .is_some();
    if !room_exists {
        return Err(AccessError::not_found("room"));
    }

    conn.execute(
        "INSERT INTO examination_room(event, room) VALUES(?, ?)",
        (event_id, room_label),
    )
    .map_err(|e| match AccessError::from(e) {
        AccessError::Conflict(_) => AccessError::Conflict(format!(
            "room {} is already assigned to event {}",
            room_label, event_id
        )),
        other => other,
    })?;
    let id = conn.last_insert_rowid();
    debug!(event_id, room = room_label, id, "room assigned");

    Ok(ExaminationRoom {
        id,
        event: event_id,
        room: room_label.to_string(),
        supervisor: None,
    })
}

/// Rooms assigned to `event_id` with capacity and supervisor acronym.
pub fn fetch_rooms_for_event(conn: &Connection, event_id: i64) -> AccessResult<Vec<EventRoom>> {
    let mut stmt = conn.prepare(
        "SELECT r.label, r.capacity, t.acro
         FROM examination_room er
         JOIN room r ON r.label = er.room
         LEFT JOIN teacher t ON t.acro = er.supervisor
         WHERE er.event = ?
         ORDER BY r.label",
    )?;
    let rows = stmt.query_map([event_id], |r| {
        let teacher: Option<String> = r.get(2)?;
        Ok(EventRoom {
            label: r.get(0)?,
            capacity: r.get(1)?,
            teacher: teacher.unwrap_or_else(|| NO_SUPERVISOR.to_string()),
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
