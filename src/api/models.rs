use axum::{
    Json,
    extract::{FromRequest, multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{
    errors::CarebookError,
    models::{appointment::Appointment, audit::AppLog, doctor::DoctorProfile, user::UserProfile},
};
use crate::infrastructure::payments::PaymentOrder;

// Request bodies. Fields are optional so that a missing field is reported by the
// workflow's own validation; unknown fields are rejected during deserialization.

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    /// Must match the token's user when present.
    pub user_id: Option<String>,
    pub doc_id: Option<String>,
    #[serde(alias = "slotDate")]
    pub date: Option<String>,
    #[serde(alias = "slotTime")]
    pub time: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CancelAppointmentRequest {
    pub user_id: Option<String>,
    pub appointment_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PaymentRequest {
    pub user_id: Option<String>,
    pub appointment_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ChangeAvailabilityRequest {
    pub doc_id: Option<String>,
}

/// JSON body extractor whose rejections use the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

// Response envelopes

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub token: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    #[serde(rename = "userData")]
    pub user_data: UserProfile,
}

#[derive(Serialize, ToSchema)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

#[derive(Serialize, ToSchema)]
pub struct AppointmentResponse {
    pub success: bool,
    pub message: String,
    pub appointment: Appointment,
}

#[derive(Serialize, ToSchema)]
pub struct AppointmentsResponse {
    pub success: bool,
    pub appointments: Vec<Appointment>,
}

#[derive(Serialize, ToSchema)]
pub struct PaymentOrderResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub order: PaymentOrder,
}

#[derive(Serialize, ToSchema)]
pub struct DoctorResponse {
    pub success: bool,
    pub message: String,
    pub doctor: DoctorProfile,
}

#[derive(Serialize, ToSchema)]
pub struct DoctorsResponse {
    pub success: bool,
    pub doctors: Vec<DoctorProfile>,
}

#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub success: bool,
    pub message: String,
    pub available: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ActivityLogResponse {
    pub success: bool,
    pub logs: Vec<AppLog>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

// Newtype wrapper for CarebookError to implement IntoResponse
#[derive(Debug)]
pub struct ApiError(pub CarebookError);

impl From<CarebookError> for ApiError {
    fn from(err: CarebookError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(CarebookError::MalformedRequest(rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError(CarebookError::MalformedRequest(err.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CarebookError::MissingField(_)
            | CarebookError::InvalidEmail(_)
            | CarebookError::InvalidInput(..)
            | CarebookError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            CarebookError::UserNotFound(_) | CarebookError::DoctorNotFound(_) | CarebookError::AppointmentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CarebookError::EmailAlreadyRegistered(_)
            | CarebookError::DoctorUnavailable(_)
            | CarebookError::SlotConflict { .. }
            | CarebookError::InvalidState(_) => StatusCode::CONFLICT,
            CarebookError::Forbidden(_) => StatusCode::FORBIDDEN,
            CarebookError::InvalidCredentials | CarebookError::MissingToken | CarebookError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            CarebookError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CarebookError::StorageError(_)
            | CarebookError::LoggingError(_)
            | CarebookError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            CarebookError::MissingField(_) => "All fields are required".to_string(),
            CarebookError::InvalidEmail(_) => "Invalid email".to_string(),
            CarebookError::InvalidInput(_, field) => field.description.clone(),
            CarebookError::DoctorUnavailable(_) => "Doctor not available".to_string(),
            CarebookError::SlotConflict { .. } => "Slot already booked".to_string(),
            CarebookError::Forbidden(msg) => msg.clone(),
            CarebookError::InvalidToken(_) => "Invalid token".to_string(),
            // Internal details stay in the logs.
            CarebookError::StorageError(_) | CarebookError::LoggingError(_) | CarebookError::InternalServerError(_) => {
                "Something went wrong".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}: {}", status, self.0);
        } else if self.0.is_validation() {
            tracing::debug!("Rejected request: {}", self.0);
        } else {
            tracing::info!("{}: {}", status, self.0);
        }
        let body = ErrorResponse {
            success: false,
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
