//! Examination events under a session component.

use crate::access::models::Event;
use crate::access::require_non_blank;
use crate::error::{AccessError, AccessResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

pub fn fetch_ue_events(conn: &Connection, session_compo_id: i64) -> AccessResult<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT id, label, session_compo, completed
         FROM event
         WHERE session_compo = ?
         ORDER BY id",
    )?;
    let rows = stmt.query_map([session_compo_id], |r| {
        Ok(Event {
            id: r.get(0)?,
            label: r.get(1)?,
            session_compo: r.get(2)?,
            completed: r.get::<_, i64>(3)? != 0,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn add_event_to_session_compo(
    conn: &Connection,
    session_compo_id: i64,
    label: &str,
) -> AccessResult<Event> {
    let label = require_non_blank("label", label)?;
    let compo_known = conn
        .query_row(
            "SELECT 1 FROM session_compo WHERE id = ?",
            [session_compo_id],
            |r| r.get::<_, i64>(0),
        )
        .optional()?
        .is_some();
    if !compo_known {
        return Err(AccessError::not_found("session_compo"));
    }

    conn.execute(
        "INSERT INTO event(session_compo, label, completed) VALUES(?, ?, 0)",
        (session_compo_id, &label),
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, session_compo_id, label = %label, "event created");
    Ok(Event {
        id,
        label,
        session_compo: session_compo_id,
        completed: false,
    })
}

pub fn set_event_completed(conn: &Connection, event_id: i64, completed: bool) -> AccessResult<()> {
    let changed = conn.execute(
        "UPDATE event SET completed = ? WHERE id = ?",
        (completed as i64, event_id),
    )?;
    if changed == 0 {
        return Err(AccessError::not_found("event"));
    }
    debug!(event_id, completed, "event completion updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::fixtures;
    use crate::error::ErrorKind;

    #[test]
    fn new_events_start_open() {
        let conn = fixtures::seeded();
        let created = add_event_to_session_compo(&conn, 1, "Examen oral").expect("event");
        assert!(!created.completed);

        let events = fetch_ue_events(&conn, 1).expect("events");
        assert_eq!(
            events.iter().map(|e| e.label.as_str()).collect::<Vec<_>>(),
            vec!["Examen écrit", "Examen oral"]
        );
        assert!(fetch_ue_events(&conn, 42).expect("no compo").is_empty());
    }

    #[test]
    fn unknown_compo_is_rejected() {
        let conn = fixtures::seeded();
        let err = add_event_to_session_compo(&conn, 42, "Rattrapage").expect_err("no compo");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(fixtures::count(&conn, "event"), 1);
    }

    #[test]
    fn completion_flag_round_trips() {
        let conn = fixtures::seeded();
        set_event_completed(&conn, 1, true).expect("close event");
        assert!(fetch_ue_events(&conn, 1).expect("events")[0].completed);

        set_event_completed(&conn, 1, false).expect("reopen");
        assert!(!fetch_ue_events(&conn, 1).expect("events")[0].completed);

        assert_eq!(
            set_event_completed(&conn, 9, true)
                .expect_err("no event")
                .kind(),
            ErrorKind::NotFound
        );
    }
}
