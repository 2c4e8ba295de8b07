//! Binary entrypoint: read one JSON request from stdin, write one JSON response to stdout.
//!
//! The request's `op` field selects the operation. Rejected requests produce an
//! ErrorOutput object and a non-zero exit code. Logs go to stderr.

use burnout_engine::types::ErrorOutput;
use burnout_engine::{Engine, EngineError, Request};
use std::io::{self, Read, Write};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "burnout_engine=info".into()))
    .with_writer(io::stderr)
    .init();

  let code = match run_binary() {
    Ok(()) => 0,
    Err(e) => {
      warn!(error = %e, "request rejected");
      let err = match &e {
        EngineError::Validation { field, reason } => ErrorOutput::new(reason.clone()).with_field(field.clone()),
        _ => ErrorOutput::new(e.to_string()),
      };
      let mut out = io::stdout().lock();
      let _ = serde_json::to_writer(&mut out, &err);
      let _ = writeln!(out);
      1
    }
  };
  std::process::exit(code);
}

fn run_binary() -> Result<(), EngineError> {
  let mut raw = String::new();
  io::stdin()
    .lock()
    .read_to_string(&mut raw)
    .map_err(|e| EngineError::parse(format!("read stdin: {}", e)))?;
  let request: Request = serde_json::from_str(raw.trim())?;
  debug!(?request, "handling request");

  let engine = Engine::with_defaults();
  let response = engine.handle(&request)?;

  let mut out = io::stdout().lock();
  serde_json::to_writer(&mut out, &response)?;
  writeln!(out).map_err(|e| EngineError::parse(format!("write stdout: {}", e)))?;
  Ok(())
}
