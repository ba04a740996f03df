use std::path::PathBuf;

use crate::auth::{AuthProvider, SessionContext};
use crate::config::AttendoConfig;
use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub config: AttendoConfig,
    pub auth: Box<dyn AuthProvider>,
    pub identity: SessionContext,
}
