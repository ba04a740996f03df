//! Roster, supervisors and per-room presence marks.

use crate::access::lookups::resolve_examination_room;
use crate::access::models::{Presence, RoomKey, Student, Teacher};
use crate::error::{AccessError, AccessResult};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::debug;

fn student_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        student_id: r.get(0)?,
        firstname: r.get(1)?,
        lastname: r.get(2)?,
    })
}

pub fn fetch_all_students(conn: &Connection) -> AccessResult<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT student_id, firstname, lastname
         FROM student
         ORDER BY lastname, firstname, student_id",
    )?;
    let rows = stmt.query_map([], student_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Students enrolled (via PAE) in `ue`.
pub fn fetch_students_by_ue(conn: &Connection, ue: &str) -> AccessResult<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT s.student_id, s.firstname, s.lastname
         FROM pae p
         JOIN student s ON s.student_id = p.student_id
         WHERE p.ue = ?
         ORDER BY s.lastname, s.firstname, s.student_id",
    )?;
    let rows = stmt.query_map([ue], student_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn fetch_supervisors(conn: &Connection) -> AccessResult<Vec<Teacher>> {
    let mut stmt = conn.prepare("SELECT acro, names FROM teacher ORDER BY acro")?;
    let rows = stmt.query_map([], |r| {
        Ok(Teacher {
            acro: r.get(0)?,
            names: r.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Supervisor acronym of the room, `None` when nobody is assigned.
pub fn fetch_room_supervisor(conn: &Connection, key: &RoomKey) -> AccessResult<Option<String>> {
    let room_id = resolve_examination_room(conn, key)?;
    let acro: Option<String> = conn.query_row(
        "SELECT t.acro
         FROM examination_room er
         LEFT JOIN teacher t ON t.acro = er.supervisor
         WHERE er.id = ?",
        [room_id],
        |r| r.get(0),
    )?;
    Ok(acro)
}

pub fn update_supervisor(conn: &Connection, key: &RoomKey, teacher_acro: &str) -> AccessResult<()> {
    let room_id = resolve_examination_room(conn, key)?;
    let known = conn
        .query_row("SELECT 1 FROM teacher WHERE acro = ?", [teacher_acro], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?
        .is_some();
    if !known {
        return Err(AccessError::not_found("teacher"));
    }
    conn.execute(
        "UPDATE examination_room SET supervisor = ? WHERE id = ?",
        (teacher_acro, room_id),
    )?;
    debug!(room = %key.room, supervisor = teacher_acro, "supervisor updated");
    Ok(())
}

/// Flips the student's presence in the room and returns the new state.
///
/// Runs under an immediate transaction so two daemons sharing the workspace
/// cannot interleave the read and the write.
pub fn toggle_presence(conn: &Connection, student_id: i64, key: &RoomKey) -> AccessResult<Presence> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let room_id = resolve_examination_room(&tx, key)?;

    let existing = match tx.query_row(
        "SELECT id FROM examination WHERE student = ? AND examination_room = ?",
        (student_id, room_id),
        |r| r.get::<_, i64>(0),
    ) {
        Ok(id) => Some(id),
        // No row is the ordinary "absent" case, not a failure.
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e.into()),
    };

    let state = match existing {
        Some(id) => {
            tx.execute("DELETE FROM examination WHERE id = ?", [id])?;
            Presence::Absent
        }
        None => {
            let student_known = tx
                .query_row(
                    "SELECT 1 FROM student WHERE student_id = ?",
                    [student_id],
                    |r| r.get::<_, i64>(0),
                )
                .optional()?
                .is_some();
            if !student_known {
                return Err(AccessError::not_found("student"));
            }
            tx.execute(
                "INSERT INTO examination(student, examination_room, marked_at) VALUES(?, ?, ?)",
                (student_id, room_id, chrono::Utc::now().to_rfc3339()),
            )?;
            Presence::Present
        }
    };
    tx.commit()?;

    debug!(student_id, room = %key.room, ?state, "presence toggled");
    Ok(state)
}

/// Ids of the students currently marked present in the room.
pub fn fetch_presences_by_room(conn: &Connection, key: &RoomKey) -> AccessResult<Vec<i64>> {
    let room_id = resolve_examination_room(conn, key)?;
    let mut stmt = conn.prepare(
        "SELECT student FROM examination WHERE examination_room = ? ORDER BY student",
    )?;
    let rows = stmt.query_map([room_id], |r| r.get(0))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::fixtures;
    use crate::access::rooms::assign_room_to_event;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn with_room() -> Connection {
        let conn = fixtures::seeded();
        assign_room_to_event(&conn, 1, "L101").expect("assign L101");
        conn
    }

    #[test]
    fn toggle_alternates_present_and_absent() {
        let conn = with_room();
        let key = RoomKey::code("L101");

        assert_eq!(toggle_presence(&conn, 1, &key).expect("first"), Presence::Present);
        assert_eq!(fetch_presences_by_room(&conn, &key).expect("present"), vec![1]);

        assert_eq!(toggle_presence(&conn, 1, &key).expect("second"), Presence::Absent);
        assert!(fetch_presences_by_room(&conn, &key).expect("absent").is_empty());

        assert_eq!(toggle_presence(&conn, 1, &key).expect("third"), Presence::Present);
    }

    fn shared_workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("workspace dir");
        let conn = crate::db::open_db(dir.path(), "attendo.sqlite3").expect("open store");
        conn.execute_batch(
            "INSERT INTO session(id, label) VALUES(1, 'Juin 2025');
             INSERT INTO ue(ue) VALUES('INFO1');
             INSERT INTO session_compo(id, session, ue) VALUES(1, 1, 'INFO1');
             INSERT INTO event(id, label, session_compo) VALUES(1, 'Examen écrit', 1);
             INSERT INTO room(label, capacity) VALUES('L101', 30);
             INSERT INTO examination_room(event, room) VALUES(1, 'L101');
             INSERT INTO student(student_id, firstname, lastname) VALUES(1, 'Léa', 'Dupont');",
        )
        .expect("seed store");
        dir
    }

    #[test]
    fn toggles_from_two_connections_see_each_other() {
        let dir = shared_workspace();
        let a = crate::db::open_db(dir.path(), "attendo.sqlite3").expect("open a");
        let b = crate::db::open_db(dir.path(), "attendo.sqlite3").expect("open b");
        let key = RoomKey::code("L101");

        assert_eq!(toggle_presence(&a, 1, &key).expect("a marks"), Presence::Present);
        assert_eq!(toggle_presence(&b, 1, &key).expect("b unmarks"), Presence::Absent);
        assert_eq!(toggle_presence(&b, 1, &key).expect("b marks"), Presence::Present);
        assert_eq!(fetch_presences_by_room(&a, &key).expect("present"), vec![1]);

        let duplicate = a
            .execute(
                "INSERT INTO examination(student, examination_room) VALUES(1, 1)",
                [],
            )
            .expect_err("second row for the same student and room");
        assert_eq!(AccessError::from(duplicate).kind(), ErrorKind::Conflict);
        assert_eq!(fixtures::count(&a, "examination"), 1);
    }

    #[test]
    fn racing_toggles_never_duplicate_a_mark() {
        let dir = shared_workspace();
        let workers: Vec<_> = (0..2)
            .map(|_| {
                let path = dir.path().to_path_buf();
                std::thread::spawn(move || {
                    let conn = crate::db::open_db(&path, "attendo.sqlite3").expect("open");
                    let key = RoomKey::code("L101");
                    for _ in 0..10 {
                        toggle_presence(&conn, 1, &key).expect("toggle");
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker");
        }

        // Twenty flips in total land back on absent.
        let conn = crate::db::open_db(dir.path(), "attendo.sqlite3").expect("open");
        assert_eq!(fixtures::count(&conn, "examination"), 0);
        assert_eq!(
            toggle_presence(&conn, 1, &RoomKey::code("L101")).expect("after race"),
            Presence::Present
        );
    }

    #[test]
    fn presences_reflect_the_net_set() {
        let conn = with_room();
        let key = RoomKey::code("L101").in_event(1);
        for student in [1, 2, 3] {
            toggle_presence(&conn, student, &key).expect("mark present");
        }
        toggle_presence(&conn, 2, &key).expect("mark 2 absent");

        assert_eq!(fetch_presences_by_room(&conn, &key).expect("net"), vec![1, 3]);
        assert_eq!(fixtures::count(&conn, "examination"), 2);
    }

    #[test]
    fn unknown_room_mutates_nothing() {
        let conn = with_room();
        toggle_presence(&conn, 1, &RoomKey::code("L101")).expect("seed presence");
        let before = fixtures::count(&conn, "examination");

        let key = RoomKey::code("Z999");
        let toggled = toggle_presence(&conn, 2, &key).expect_err("unknown room");
        assert_eq!(toggled.kind(), ErrorKind::NotFound);
        let listed = fetch_presences_by_room(&conn, &key).expect_err("unknown room");
        assert_eq!(listed.kind(), ErrorKind::NotFound);

        assert_eq!(fixtures::count(&conn, "examination"), before);
    }

    #[test]
    fn unknown_student_cannot_be_marked() {
        let conn = with_room();
        let err = toggle_presence(&conn, 404, &RoomKey::code("L101")).expect_err("no student");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(fixtures::count(&conn, "examination"), 0);
    }

    #[test]
    fn roster_queries_project_students() {
        let conn = fixtures::seeded();
        conn.execute(
            "INSERT INTO student(student_id, firstname, lastname) VALUES(4, 'Zoé', 'Aubert')",
            [],
        )
        .expect("unenrolled student");

        let all = fetch_all_students(&conn).expect("all");
        assert_eq!(
            all.iter().map(|s| s.student_id).collect::<Vec<_>>(),
            vec![4, 3, 1, 2]
        );

        let enrolled = fetch_students_by_ue(&conn, "INFO1").expect("enrolled");
        assert_eq!(
            enrolled.iter().map(|s| s.student_id).collect::<Vec<_>>(),
            vec![3, 1, 2]
        );
        assert!(fetch_students_by_ue(&conn, "MATH2").expect("none").is_empty());
    }

    #[test]
    fn supervisor_read_and_write() {
        let conn = with_room();
        let key = RoomKey::code("L101");
        assert_eq!(fetch_room_supervisor(&conn, &key).expect("unset"), None);

        update_supervisor(&conn, &key, "XYZ").expect("assign XYZ");
        assert_eq!(
            fetch_room_supervisor(&conn, &key).expect("set"),
            Some("XYZ".to_string())
        );

        let err = update_supervisor(&conn, &key, "NOPE").expect_err("unknown teacher");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let supervisors = fetch_supervisors(&conn).expect("supervisors");
        assert_eq!(
            supervisors.iter().map(|t| t.acro.as_str()).collect::<Vec<_>>(),
            vec!["ABC", "XYZ"]
        );
    }
}
