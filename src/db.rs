use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub fn open_db(workspace: &Path, file_name: &str) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(file_name);
    let conn = Connection::open(db_path)?;
    // Other daemons may hold the write lock on a shared workspace.
    conn.busy_timeout(Duration::from_secs(5))?;
    init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS session(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            label TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ue(
            ue TEXT PRIMARY KEY
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS session_compo(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session INTEGER NOT NULL,
            ue TEXT NOT NULL,
            FOREIGN KEY(session) REFERENCES session(id),
            FOREIGN KEY(ue) REFERENCES ue(ue),
            UNIQUE(session, ue)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_session_compo_session ON session_compo(session)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS event(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            label TEXT NOT NULL,
            session_compo INTEGER NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(session_compo) REFERENCES session_compo(id)
        )",
        [],
    )?;
    // Workspaces created before events could be closed lack the flag.
    ensure_event_completed(conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_event_session_compo ON event(session_compo)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS room(
            label TEXT PRIMARY KEY,
            capacity INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teacher(
            acro TEXT PRIMARY KEY,
            names TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS examination_room(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event INTEGER NOT NULL,
            room TEXT NOT NULL,
            supervisor TEXT,
            FOREIGN KEY(event) REFERENCES event(id),
            FOREIGN KEY(room) REFERENCES room(label),
            FOREIGN KEY(supervisor) REFERENCES teacher(acro),
            UNIQUE(event, room)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_examination_room_room ON examination_room(room)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS student(
            student_id INTEGER PRIMARY KEY,
            firstname TEXT NOT NULL,
            lastname TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS pae(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            ue TEXT NOT NULL,
            FOREIGN KEY(student_id) REFERENCES student(student_id),
            FOREIGN KEY(ue) REFERENCES ue(ue),
            UNIQUE(student_id, ue)
        )",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_pae_ue ON pae(ue)", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS examination(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student INTEGER NOT NULL,
            examination_room INTEGER NOT NULL,
            marked_at TEXT,
            FOREIGN KEY(student) REFERENCES student(student_id),
            FOREIGN KEY(examination_room) REFERENCES examination_room(id),
            UNIQUE(student, examination_room)
        )",
        [],
    )?;
    ensure_examination_marked_at(conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_examination_room ON examination(examination_room)",
        [],
    )?;

    Ok(())
}

fn ensure_event_completed(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "event", "completed")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE event ADD COLUMN completed INTEGER NOT NULL DEFAULT 0",
        [],
    )?;
    Ok(())
}

fn ensure_examination_marked_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "examination", "marked_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE examination ADD COLUMN marked_at TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
