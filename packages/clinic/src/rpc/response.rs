use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// `{"result": {"data": ...}}`
#[derive(Debug, Serialize)]
pub struct Success {
    result: Data,
}

#[derive(Debug, Serialize)]
struct Data {
    data: Value,
}

impl Success {
    pub fn new(data: Value) -> Self {
        Success {
            result: Data { data },
        }
    }
}

impl IntoResponse for Success {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Serialize)]
pub struct Failure {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Failure {
            error: ErrorBody {
                code: err.code().as_str(),
                message: err.to_string(),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.code().status(), Json(Failure::from(&self))).into_response()
    }
}
