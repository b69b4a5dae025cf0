use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize)]
pub enum CarebookError {
    #[error("Field `{0}` is required")]
    MissingField(String),
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
    #[error("Invalid input for field `{0}`: {desc}", desc = .1.description)]
    InvalidInput(String, FieldError),
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Doctor {0} not found")]
    DoctorNotFound(String),
    #[error("Appointment {0} not found")]
    AppointmentNotFound(String),
    #[error("Doctor {0} is not available")]
    DoctorUnavailable(String),
    #[error("Slot {date} {time} already booked")]
    SlotConflict { date: String, time: String },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No token provided")]
    MissingToken,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl CarebookError {
    /// Input problems detected before any workflow logic runs.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CarebookError::MissingField(_)
                | CarebookError::InvalidEmail(_)
                | CarebookError::InvalidInput(..)
                | CarebookError::MalformedRequest(_)
        )
    }
}
