use serde::Serialize;

/// Placeholder shown for an examination room without a supervisor.
pub const NO_SUPERVISOR: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ue {
    pub ue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCompo {
    pub id: i64,
    pub session: i64,
    pub ue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub label: String,
    pub session_compo: i64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub label: String,
    pub capacity: i64,
}

/// A room assigned to an event, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRoom {
    pub label: String,
    pub capacity: i64,
    pub teacher: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExaminationRoom {
    pub id: i64,
    pub event: i64,
    pub room: String,
    pub supervisor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teacher {
    pub acro: String,
    pub names: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: i64,
    pub firstname: String,
    pub lastname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub ue: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Present,
    Absent,
}

/// Identifies one examination-room assignment by room code, optionally
/// narrowed to an event when the same room serves several events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomKey {
    pub room: String,
    pub event: Option<i64>,
}

impl RoomKey {
    pub fn code(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            event: None,
        }
    }

    pub fn in_event(mut self, event: i64) -> Self {
        self.event = Some(event);
        self
    }
}
