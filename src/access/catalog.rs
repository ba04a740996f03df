//! Writes for reference data: rooms, teachers, students, UEs, enrollments.

use crate::access::models::{Enrollment, Room, Student, Teacher, Ue};
use crate::access::require_non_blank;
use crate::error::{AccessError, AccessResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

fn conflict_on_duplicate(e: rusqlite::Error, what: String) -> AccessError {
    match AccessError::from(e) {
        AccessError::Conflict(_) => AccessError::Conflict(format!("{} already exists", what)),
        other => other,
    }
}

pub fn add_room(conn: &Connection, label: &str, capacity: i64) -> AccessResult<Room> {
    let label = require_non_blank("label", label)?;
    if capacity < 0 {
        return Err(AccessError::Invalid("capacity must not be negative".into()));
    }
    conn.execute(
        "INSERT INTO room(label, capacity) VALUES(?, ?)",
        (&label, capacity),
    )
    .map_err(|e| conflict_on_duplicate(e, format!("room {}", label)))?;
    debug!(label = %label, capacity, "room created");
    Ok(Room { label, capacity })
}

pub fn add_teacher(conn: &Connection, acro: &str, names: &str) -> AccessResult<Teacher> {
    let acro = require_non_blank("acro", acro)?;
    let names = require_non_blank("names", names)?;
    conn.execute(
        "INSERT INTO teacher(acro, names) VALUES(?, ?)",
        (&acro, &names),
    )
    .map_err(|e| conflict_on_duplicate(e, format!("teacher {}", acro)))?;
    Ok(Teacher { acro, names })
}

pub fn add_student(
    conn: &Connection,
    student_id: i64,
    firstname: &str,
    lastname: &str,
) -> AccessResult<Student> {
    let firstname = require_non_blank("firstname", firstname)?;
    let lastname = require_non_blank("lastname", lastname)?;
    conn.execute(
        "INSERT INTO student(student_id, firstname, lastname) VALUES(?, ?, ?)",
        (student_id, &firstname, &lastname),
    )
    .map_err(|e| conflict_on_duplicate(e, format!("student {}", student_id)))?;
    Ok(Student {
        student_id,
        firstname,
        lastname,
    })
}

pub fn add_ue(conn: &Connection, ue: &str) -> AccessResult<Ue> {
    let ue = require_non_blank("ue", ue)?;
    conn.execute("INSERT INTO ue(ue) VALUES(?)", [&ue])
        .map_err(|e| conflict_on_duplicate(e, format!("ue {}", ue)))?;
    Ok(Ue { ue })
}

/// Enrolls a student in a UE (a PAE row).
pub fn enroll_student(conn: &Connection, student_id: i64, ue: &str) -> AccessResult<Enrollment> {
    let ue = require_non_blank("ue", ue)?;
    let student_known = conn
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
    let ue_known = conn
        .query_row("SELECT 1 FROM ue WHERE ue = ?", [&ue], |r| r.get::<_, i64>(0))
        .optional()?
        .is_some();
    if !ue_known {
        return Err(AccessError::not_found("ue"));
    }

    conn.execute(
        "INSERT INTO pae(student_id, ue) VALUES(?, ?)",
        (student_id, &ue),
    )
    .map_err(|e| conflict_on_duplicate(e, format!("enrollment of {} in {}", student_id, ue)))?;
    let id = conn.last_insert_rowid();
    debug!(student_id, ue = %ue, "student enrolled");
    Ok(Enrollment { id, student_id, ue })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::presence::{fetch_students_by_ue, fetch_supervisors};
    use crate::error::ErrorKind;

    #[test]
    fn catalog_writes_feed_roster_reads() {
        let conn = crate::db::open_in_memory().expect("store");
        add_ue(&conn, "CHIM3").expect("ue");
        add_student(&conn, 7, "Inès", "Lambert").expect("student");
        add_teacher(&conn, "QRS", "Quentin Roussel").expect("teacher");
        enroll_student(&conn, 7, "CHIM3").expect("enrollment");

        let enrolled = fetch_students_by_ue(&conn, "CHIM3").expect("roster");
        assert_eq!(enrolled.len(), 1);
        assert_eq!(enrolled[0].lastname, "Lambert");
        assert_eq!(fetch_supervisors(&conn).expect("teachers")[0].acro, "QRS");
    }

    #[test]
    fn duplicates_and_dangling_references_are_rejected() {
        let conn = crate::db::open_in_memory().expect("store");
        add_room(&conn, "L101", 30).expect("room");
        let dup = add_room(&conn, "L101", 12).expect_err("duplicate room");
        assert_eq!(dup.kind(), ErrorKind::Conflict);
        assert_eq!(dup.to_string(), "conflict: room L101 already exists");

        assert_eq!(
            add_room(&conn, "L102", -1).expect_err("negative").kind(),
            ErrorKind::Invalid
        );
        assert_eq!(
            enroll_student(&conn, 1, "NONE").expect_err("no student").kind(),
            ErrorKind::NotFound
        );

        add_student(&conn, 1, "Léa", "Dupont").expect("student");
        add_ue(&conn, "INFO1").expect("ue");
        enroll_student(&conn, 1, "INFO1").expect("first enrollment");
        assert_eq!(
            enroll_student(&conn, 1, "INFO1").expect_err("twice").kind(),
            ErrorKind::Conflict
        );
    }
}
