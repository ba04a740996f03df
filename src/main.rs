mod access;
mod auth;
mod config;
mod db;
mod error;
mod ipc;
mod routes;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use auth::{LocalAuthProvider, SessionContext};
use config::AttendoConfig;
use tracing::{debug, info, warn};

fn init_tracing(config: &AttendoConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("ATTENDO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter));

    // stdout carries responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = AttendoConfig::load().context("failed to load configuration")?;
    init_tracing(&config)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        auth_required = config.auth.required,
        "attendod starting"
    );

    let mut state = ipc::AppState {
        workspace: None,
        db: None,
        auth: Box::new(LocalAuthProvider::new(config.auth.clone())),
        identity: SessionContext::new(),
        config,
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => {
                debug!(id = %req.id, method = %req.method, "request");
                ipc::handle_request(&mut state, req)
            }
            Err(e) => {
                // Can't reply with an id.
                warn!(error = %e, "unparseable request line");
                ipc::bad_json(e.to_string())
            }
        };
        writeln!(stdout, "{}", resp).context("write response")?;
        stdout.flush().context("flush response")?;
    }

    state.identity.shutdown();
    info!("attendod stopped");
    Ok(())
}
