use axum::http::StatusCode;
use metrics_exporter_prometheus::BuildError;
use std::io;
use thiserror::Error;
use tokio_postgres::error::SqlState;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Metrics(#[from] BuildError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Server host {name} is not a valid server name")]
    InvalidServerName { name: String },

    #[error("Invalid parameter {name} with value {value}")]
    InvalidParameter { name: String, value: String },

    #[error("Missing field {name} from configuration file or environment")]
    MissingParameter { name: String },

    #[error(transparent)]
    FileOrEnvironment(#[from] config::ConfigError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Error creating connection after {retries} retries")]
    Connection { retries: u32 },

    #[error(transparent)]
    Database(tokio_postgres::Error),

    #[error("duplicate key value violates unique constraint \"{constraint}\"")]
    UniqueViolation { constraint: String },

    #[error("Expected a row to be returned by {statement}")]
    MissingRow { statement: &'static str },
}

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Either CNIC or phone number must be provided")]
    MissingContact,

    #[error("{message}")]
    Required { message: &'static str },
}

#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("Cannot delete doctor with ID {id} because they have existing visits")]
    DoctorHasVisits { id: i32 },

    #[error("Doctor with ID {id} not found")]
    DoctorNotFound { id: i32 },

    #[error("Cannot delete location. There are {count} doctor(s) associated with this location")]
    LocationHasDoctors { count: i64 },

    #[error("Location with ID {id} not found")]
    LocationNotFound { id: i32 },

    #[error("Location with id {id} does not exist")]
    MissingLocation { id: i32 },

    #[error("Patient with ID {id} does not exist")]
    MissingPatient { id: i32 },

    #[error("Doctor with ID {id} does not exist")]
    MissingDoctor { id: i32 },

    #[error("Patient with this CNIC already exists")]
    DuplicateCnic,

    #[error("Patient with this phone number already exists")]
    DuplicatePhone,
}

#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("Doctor profile not found. Please contact administrator.")]
    DoctorProfileNotFound,

    #[error("Invalid username or password")]
    InvalidCredentials,
}

#[derive(Error, Debug, PartialEq)]
pub enum RpcError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Unsupported GET-request to mutation procedure at path \"{name}\"")]
    MethodNotSupported { name: String },

    #[error("No procedure found on path \"{name}\"")]
    UnknownProcedure { name: String },
}

///
/// Error codes reported to RPC clients alongside the message.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    NotFound,
    MethodNotSupported,
    Conflict,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Validation(_) => ErrorCode::BadRequest,
            Error::Rpc(RpcError::InvalidInput { .. }) => ErrorCode::BadRequest,
            Error::Rpc(RpcError::UnknownProcedure { .. }) => ErrorCode::NotFound,
            Error::Rpc(RpcError::MethodNotSupported { .. }) => ErrorCode::MethodNotSupported,
            Error::Auth(_) => ErrorCode::Unauthorized,
            Error::Record(err) => match err {
                RecordError::DoctorNotFound { .. }
                | RecordError::LocationNotFound { .. }
                | RecordError::MissingLocation { .. }
                | RecordError::MissingPatient { .. }
                | RecordError::MissingDoctor { .. } => ErrorCode::NotFound,
                RecordError::DoctorHasVisits { .. }
                | RecordError::LocationHasDoctors { .. }
                | RecordError::DuplicateCnic
                | RecordError::DuplicatePhone => ErrorCode::Conflict,
            },
            Error::Store(StoreError::UniqueViolation { .. }) => ErrorCode::Conflict,
            _ => ErrorCode::InternalServerError,
        }
    }
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            let constraint = e
                .as_db_error()
                .and_then(|db| db.constraint())
                .unwrap_or("unknown")
                .to_string();
            return StoreError::UniqueViolation { constraint };
        }
        StoreError::Database(e)
    }
}

impl From<tokio_postgres::Error> for Error {
    fn from(e: tokio_postgres::Error) -> Self {
        Error::Store(e.into())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Rpc(RpcError::InvalidInput {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_conflicting_field() {
        assert!(RecordError::DuplicateCnic
            .to_string()
            .contains("CNIC already exists"));
        assert!(RecordError::DuplicatePhone
            .to_string()
            .contains("phone number already exists"));
    }

    #[test]
    fn blocked_location_delete_reports_count() {
        let err = RecordError::LocationHasDoctors { count: 2 };
        assert_eq!(
            err.to_string(),
            "Cannot delete location. There are 2 doctor(s) associated with this location"
        );
    }

    #[test]
    fn unique_violation_mentions_unique() {
        let err = StoreError::UniqueViolation {
            constraint: "patients_cnic_unique".to_string(),
        };
        assert!(err.to_string().contains("unique"));
    }

    #[test]
    fn error_codes() {
        let err: Error = ValidationError::MissingContact.into();
        assert_eq!(err.code(), ErrorCode::BadRequest);

        let err: Error = RecordError::LocationNotFound { id: 1 }.into();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.code().status(), StatusCode::NOT_FOUND);

        let err: Error = RecordError::DoctorHasVisits { id: 1 }.into();
        assert_eq!(err.code(), ErrorCode::Conflict);

        let err: Error = RpcError::MethodNotSupported {
            name: "deleteVisit".to_string(),
        }
        .into();
        assert_eq!(err.code().status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.code().as_str(), "METHOD_NOT_SUPPORTED");

        let err: Error = AuthError::InvalidCredentials.into();
        assert_eq!(err.code().as_str(), "UNAUTHORIZED");

        let err: Error = StoreError::MissingRow {
            statement: "INSERT",
        }
        .into();
        assert_eq!(err.code(), ErrorCode::InternalServerError);
    }
}
