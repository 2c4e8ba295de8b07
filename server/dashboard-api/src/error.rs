//! API error types and their HTTP mapping.

use axum::{
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use burnout_engine::EngineError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error("{}", .0.body_text())]
  Json(#[from] JsonRejection),

  #[error("not found: {0}")]
  NotFound(String),
}

/// Field named by a serde "missing field `x`" message, if any.
fn missing_field(message: &str) -> Option<String> {
  let rest = message.split("missing field `").nth(1)?;
  rest.split('`').next().map(str::to_string)
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, field) = match &self {
      ApiError::Engine(e) => (StatusCode::BAD_REQUEST, e.field().map(str::to_string)),
      ApiError::Json(rejection) => (StatusCode::BAD_REQUEST, missing_field(&rejection.body_text())),
      ApiError::NotFound(_) => (StatusCode::NOT_FOUND, None),
    };
    warn!(status = status.as_u16(), error = %self, "request failed");

    let mut body = json!({
      "error": self.to_string(),
      "status": status.as_u16(),
    });
    if let Some(field) = field {
      body["field"] = json!(field);
    }

    (status, Json(body)).into_response()
  }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid {key}: {value:?}")]
  Invalid { key: String, value: String },
}

impl ConfigError {
  pub fn invalid(key: &str, value: &str) -> Self {
    Self::Invalid {
      key: key.to_string(),
      value: value.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_field_is_extracted() {
    let msg = "Failed to deserialize the JSON body into the target type: missing field `factor` at line 1 column 15";
    assert_eq!(missing_field(msg).as_deref(), Some("factor"));
    assert_eq!(missing_field("expected value at line 1 column 2"), None);
  }
}
