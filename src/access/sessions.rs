use crate::access::models::{Session, SessionCompo, Ue};
use crate::access::require_non_blank;
use crate::error::{AccessError, AccessResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

pub fn fetch_sessions(conn: &Connection) -> AccessResult<Vec<Session>> {
    let mut stmt = conn.prepare("SELECT id, label FROM session ORDER BY id")?;
    let rows = stmt.query_map([], |r| {
        Ok(Session {
            id: r.get(0)?,
            label: r.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn add_session(conn: &Connection, label: &str) -> AccessResult<Session> {
    let label = require_non_blank("label", label)?;
    conn.execute("INSERT INTO session(label) VALUES(?)", [&label])?;
    let id = conn.last_insert_rowid();
    debug!(id, label = %label, "session created");
    Ok(Session { id, label })
}

pub fn fetch_all_ues(conn: &Connection) -> AccessResult<Vec<Ue>> {
    let mut stmt = conn.prepare("SELECT ue FROM ue ORDER BY ue")?;
    let rows = stmt.query_map([], |r| Ok(Ue { ue: r.get(0)? }))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// UEs attached to the session, in the order they were added.
pub fn fetch_session_ues(conn: &Connection, session_id: i64) -> AccessResult<Vec<Ue>> {
    let mut stmt = conn.prepare("SELECT ue FROM session_compo WHERE session = ? ORDER BY id")?;
    let rows = stmt.query_map([session_id], |r| Ok(Ue { ue: r.get(0)? }))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn add_ue_to_session(conn: &Connection, session_id: i64, ue: &str) -> AccessResult<SessionCompo> {
    let ue = require_non_blank("ue", ue)?;
    let session_known = conn
        .query_row("SELECT 1 FROM session WHERE id = ?", [session_id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?
        .is_some();
    if !session_known {
        return Err(AccessError::not_found("session"));
    }
    let ue_known = conn
        .query_row("SELECT 1 FROM ue WHERE ue = ?", [&ue], |r| r.get::<_, i64>(0))
        .optional()?
        .is_some();
    if !ue_known {
        return Err(AccessError::not_found("ue"));
    }

    conn.execute(
        "INSERT INTO session_compo(session, ue) VALUES(?, ?)",
        (session_id, &ue),
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, session_id, ue = %ue, "ue attached to session");
    Ok(SessionCompo {
        id,
        session: session_id,
        ue,
    })
}
