//! Single-row lookups shared by the room, presence and session pages.

use crate::access::models::RoomKey;
use crate::error::{AccessError, AccessResult};
use rusqlite::{Connection, OptionalExtension};

pub fn fetch_event_label(conn: &Connection, event_id: i64) -> AccessResult<String> {
    conn.query_row("SELECT label FROM event WHERE id = ?", [event_id], |r| {
        r.get(0)
    })
    .optional()?
    .ok_or(AccessError::not_found("event"))
}

pub fn fetch_ue_label(conn: &Connection, ue: &str) -> AccessResult<String> {
    conn.query_row("SELECT ue FROM ue WHERE ue = ?", [ue], |r| r.get(0))
        .optional()?
        .ok_or(AccessError::not_found("ue"))
}

pub fn fetch_session_label(conn: &Connection, session_id: i64) -> AccessResult<String> {
    conn.query_row(
        "SELECT label FROM session WHERE id = ?",
        [session_id],
        |r| r.get(0),
    )
    .optional()?
    .ok_or(AccessError::not_found("session"))
}

pub fn fetch_session_compo_id(conn: &Connection, ue: &str, session_id: i64) -> AccessResult<i64> {
    conn.query_row(
        "SELECT id FROM session_compo WHERE ue = ? AND session = ?",
        (ue, session_id),
        |r| r.get(0),
    )
    .optional()?
    .ok_or(AccessError::not_found("session_compo"))
}

/// Resolves a room key to its `examination_room.id`.
///
/// A bare room code must match exactly one assignment; when the room serves
/// several events the caller has to narrow the key with an event id.
pub fn resolve_examination_room(conn: &Connection, key: &RoomKey) -> AccessResult<i64> {
    let ids: Vec<i64> = match key.event {
        Some(event) => {
            let mut stmt = conn.prepare(
                "SELECT id FROM examination_room WHERE room = ? AND event = ? ORDER BY id LIMIT 2",
            )?;
            let rows = stmt.query_map((&key.room, event), |r| r.get(0))?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn
                .prepare("SELECT id FROM examination_room WHERE room = ? ORDER BY id LIMIT 2")?;
            let rows = stmt.query_map([&key.room], |r| r.get(0))?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };

    match ids.as_slice() {
        [] => Err(AccessError::not_found("examination room")),
        [id] => Ok(*id),
        _ => Err(AccessError::Conflict(format!(
            "room {} is assigned to several events; an event id is required",
            key.room
        ))),
    }
}
