#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tempfile::TempDir;

/// A running `attendod` driven over stdin/stdout.
pub struct Sidecar {
    child: Child,
    stdin: Option<ChildStdin>,
    reader: BufReader<ChildStdout>,
    next_id: u64,
    // Working directory, so no stray attendo.toml is picked up.
    _cwd: TempDir,
}

impl Sidecar {
    pub fn spawn() -> Self {
        Self::spawn_with_env(&[])
    }

    pub fn spawn_with_env(env: &[(&str, &str)]) -> Self {
        let cwd = tempfile::tempdir().expect("sidecar cwd");
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_attendod"));
        // Only the variables a test passes in may reach the daemon.
        for (key, _) in std::env::vars_os() {
            if key.to_string_lossy().starts_with("ATTENDO_") {
                cmd.env_remove(&key);
            }
        }
        cmd.current_dir(cwd.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        for (k, v) in env {
            cmd.env(k, v);
        }
        let mut child = cmd.spawn().expect("spawn attendod");
        let stdin = child.stdin.take().expect("child stdin");
        let stdout = child.stdout.take().expect("child stdout");
        Self {
            child,
            stdin: Some(stdin),
            reader: BufReader::new(stdout),
            next_id: 0,
            _cwd: cwd,
        }
    }

    pub fn send_raw(&mut self, line: &str) -> serde_json::Value {
        let stdin = self.stdin.as_mut().expect("stdin open");
        writeln!(stdin, "{}", line).expect("write request");
        stdin.flush().expect("flush request");

        let mut out = String::new();
        self.reader.read_line(&mut out).expect("read response line");
        assert!(!out.trim().is_empty(), "empty response for {}", line);
        serde_json::from_str(out.trim()).expect("parse response json")
    }

    /// Full response envelope.
    pub fn call(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        self.next_id += 1;
        let id = self.next_id.to_string();
        let payload = json!({ "id": id, "method": method, "params": params });
        let value = self.send_raw(&payload.to_string());
        assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id.as_str()));
        value
    }

    /// `result` of a call that must succeed.
    pub fn ok(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let value = self.call(method, params);
        assert!(
            value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
            "{} failed: {}",
            method,
            value
        );
        value.get("result").cloned().unwrap_or_default()
    }

    /// Error code of a call that must fail.
    pub fn error_code(&mut self, method: &str, params: serde_json::Value) -> String {
        let value = self.call(method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(false),
            "{} unexpectedly succeeded: {}",
            method,
            value
        );
        value
            .pointer("/error/code")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    }

    pub fn open_workspace(&mut self) -> TempDir {
        let dir = tempfile::tempdir().expect("workspace dir");
        self.ok(
            "workspace.select",
            json!({ "path": dir.path().to_string_lossy() }),
        );
        dir
    }

    /// Session 1 with UE INFO1 (compo 1), event 1, rooms L101/L102/L201,
    /// teacher ABC and students 1..=3 enrolled in INFO1.
    pub fn seed(&mut self) {
        self.ok("sessions.create", json!({ "label": "Juin 2025" }));
        self.ok("ues.create", json!({ "ue": "INFO1" }));
        self.ok("sessions.addUe", json!({ "sessionId": 1, "ue": "INFO1" }));
        self.ok(
            "events.create",
            json!({ "sessionCompoId": 1, "label": "Examen écrit" }),
        );
        for (label, capacity) in [("L201", 40), ("L101", 30), ("L102", 24)] {
            self.ok("rooms.create", json!({ "label": label, "capacity": capacity }));
        }
        self.ok(
            "teachers.create",
            json!({ "acro": "ABC", "names": "Alice Bernard" }),
        );
        for (id, first, last) in [(1, "Léa", "Dupont"), (2, "Hugo", "Martin"), (3, "Nora", "Bensaïd")] {
            self.ok(
                "students.create",
                json!({ "studentId": id, "firstname": first, "lastname": last }),
            );
            self.ok("enrollments.create", json!({ "studentId": id, "ue": "INFO1" }));
        }
    }
}

impl Drop for Sidecar {
    fn drop(&mut self) {
        // Closing stdin ends the request loop.
        self.stdin.take();
        let _ = self.child.wait();
    }
}
