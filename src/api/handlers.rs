use crate::{
    api::{
        forms::{AddDoctorForm, UpdateProfileForm},
        models::*,
    },
    core::{
        errors::CarebookError,
        models::appointment::BookingRequest,
        services::{CarebookService, NewUser},
    },
    infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage},
};
use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use std::sync::Arc;

pub type SharedService = Arc<CarebookService<InMemoryLogging, InMemoryStorage>>;

/// Identity of the caller, placed in request extensions by [`require_user`].
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
}

/// Placed in request extensions by [`require_admin`].
#[derive(Clone, Debug)]
pub struct AuthenticatedAdmin {
    pub email: String,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// Middleware to validate a user token from the `utoken` header
async fn require_user(
    State(service): State<SharedService>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = header_value(req.headers(), "utoken").ok_or(CarebookError::MissingToken)?;
    let id = service.authorize_user(&token)?;
    req.extensions_mut().insert(AuthenticatedUser { id });
    Ok(next.run(req).await)
}

// Middleware to validate an admin token from `token` or `Authorization: Bearer`
async fn require_admin(
    State(service): State<SharedService>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = header_value(req.headers(), "token")
        .or_else(|| {
            header_value(req.headers(), header::AUTHORIZATION.as_str()).and_then(|v| bearer_token(&v))
        })
        .ok_or(CarebookError::MissingToken)?;
    let email = service.authorize_admin(&token)?;
    req.extensions_mut().insert(AuthenticatedAdmin { email });
    Ok(next.run(req).await)
}

/// Token from an `Authorization` value; the scheme name is case-insensitive.
fn bearer_token(value: &str) -> Option<String> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// A body-supplied user id must name the authenticated user.
fn ensure_same_user(claimed: Option<&str>, user: &AuthenticatedUser) -> Result<(), ApiError> {
    match claimed.map(str::trim).filter(|c| !c.is_empty()) {
        Some(claimed) if claimed != user.id => Err(ApiError(CarebookError::Forbidden(
            "userId does not match the authenticated user".to_string(),
        ))),
        _ => Ok(()),
    }
}

// Define API routes
pub fn api_routes(service: SharedService, max_upload_bytes: usize) -> Router {
    let user_routes = Router::new()
        .route("/get-profile", get(get_profile).post(get_profile))
        .route("/update-profile", post(update_profile))
        .route("/book-appointment", post(book_appointment))
        .route("/list-appointments", get(list_appointments).post(list_appointments))
        .route("/cancel-appointment", post(cancel_appointment))
        .route("/payment-razorpay", post(payment_razorpay))
        .route_layer(middleware::from_fn_with_state(service.clone(), require_user))
        .route("/register", post(register_user))
        .route("/login", post(login_user));

    let admin_routes = Router::new()
        .route("/add-doctor", post(add_doctor))
        .route("/all-doctors", get(all_doctors).post(all_doctors))
        .route("/change-availability", post(change_availability))
        .route("/activity", get(activity_logs))
        .route_layer(middleware::from_fn_with_state(service.clone(), require_admin))
        .route("/login", post(admin_login));

    let doctor_routes = Router::new()
        .route("/change-availability", post(doctor_change_availability))
        .route_layer(middleware::from_fn_with_state(service.clone(), require_admin))
        .route("/list", get(doctor_list));

    Router::new()
        .nest("/api/user", user_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/doctor", doctor_routes)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn register_user(
    State(service): State<SharedService>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = service
        .register_user(NewUser {
            name: req.name.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
        })
        .await?;
    Ok(Json(TokenResponse {
        success: true,
        message: None,
        token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 404, description = "User does not exist", body = ErrorResponse)
    )
)]
async fn login_user(
    State(service): State<SharedService>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = service
        .login_user(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(TokenResponse {
        success: true,
        message: None,
        token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/user/get-profile",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("utoken" = []))
)]
async fn get_profile(
    State(service): State<SharedService>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user_data = service.get_profile(&user.id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user_data,
    }))
}

#[utoipa::path(
    post,
    path = "/api/user/update-profile",
    request_body(content = UpdateProfileForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Profile updated", body = UpdateProfileResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 502, description = "Image host failed", body = ErrorResponse)
    ),
    security(("utoken" = []))
)]
async fn update_profile(
    State(service): State<SharedService>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let form = UpdateProfileForm::from_multipart(multipart).await?;
    ensure_same_user(form.user_id.as_deref(), &user)?;
    let profile = service.update_profile(&user.id, form.into_changes()).await?;
    Ok(Json(UpdateProfileResponse {
        success: true,
        message: "Profile Updated".to_string(),
        user: profile,
    }))
}

#[utoipa::path(
    post,
    path = "/api/user/book-appointment",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentResponse),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 403, description = "userId does not match the token", body = ErrorResponse),
        (status = 404, description = "Doctor or user not found", body = ErrorResponse),
        (status = 409, description = "Doctor unavailable or slot already booked", body = ErrorResponse)
    ),
    security(("utoken" = []))
)]
async fn book_appointment(
    State(service): State<SharedService>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<BookAppointmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_same_user(req.user_id.as_deref(), &user)?;
    let appointment = service
        .book_appointment(BookingRequest {
            user_id: user.id,
            doc_id: req.doc_id.unwrap_or_default(),
            date: req.date.unwrap_or_default(),
            time: req.time.unwrap_or_default(),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AppointmentResponse {
            success: true,
            message: "Appointment Booked".to_string(),
            appointment,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/user/list-appointments",
    responses(
        (status = 200, description = "Appointments of the authenticated user", body = AppointmentsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("utoken" = []))
)]
async fn list_appointments(
    State(service): State<SharedService>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let appointments = service.list_appointments(&user.id).await?;
    Ok(Json(AppointmentsResponse {
        success: true,
        appointments,
    }))
}

#[utoipa::path(
    post,
    path = "/api/user/cancel-appointment",
    request_body = CancelAppointmentRequest,
    responses(
        (status = 200, description = "Appointment cancelled", body = MessageResponse),
        (status = 403, description = "Appointment belongs to another user", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 409, description = "Appointment already cancelled", body = ErrorResponse)
    ),
    security(("utoken" = []))
)]
async fn cancel_appointment(
    State(service): State<SharedService>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CancelAppointmentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_same_user(req.user_id.as_deref(), &user)?;
    service
        .cancel_appointment(&user.id, req.appointment_id.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Appointment Cancelled".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/user/payment-razorpay",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Gateway order created", body = PaymentOrderResponse),
        (status = 409, description = "Appointment cancelled or not found", body = ErrorResponse),
        (status = 502, description = "Payment gateway failed", body = ErrorResponse)
    ),
    security(("utoken" = []))
)]
async fn payment_razorpay(
    State(service): State<SharedService>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<PaymentRequest>,
) -> Result<Json<PaymentOrderResponse>, ApiError> {
    ensure_same_user(req.user_id.as_deref(), &user)?;
    let order = service
        .create_payment_order(req.appointment_id.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(PaymentOrderResponse { success: true, order }))
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Admin token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
async fn admin_login(
    State(service): State<SharedService>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = service
        .admin_login(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(TokenResponse {
        success: true,
        message: Some("Login Successful".to_string()),
        token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/add-doctor",
    request_body(content = AddDoctorForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Doctor added", body = DoctorResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 502, description = "Image host failed", body = ErrorResponse)
    ),
    security(("token" = []), ("Bearer" = []))
)]
async fn add_doctor(
    State(service): State<SharedService>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    multipart: Multipart,
) -> Result<Json<DoctorResponse>, ApiError> {
    let (new_doctor, image) = AddDoctorForm::from_multipart(multipart).await?.into_parts();
    let doctor = service.add_doctor(new_doctor, image, &admin.email).await?;
    Ok(Json(DoctorResponse {
        success: true,
        message: "Doctor Added".to_string(),
        doctor,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/all-doctors",
    responses(
        (status = 200, description = "Every doctor, including email", body = DoctorsResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    ),
    security(("token" = []), ("Bearer" = []))
)]
async fn all_doctors(State(service): State<SharedService>) -> Result<Json<DoctorsResponse>, ApiError> {
    let doctors = service.list_doctors().await?;
    Ok(Json(DoctorsResponse { success: true, doctors }))
}

async fn toggle(
    service: &SharedService,
    admin: &AuthenticatedAdmin,
    req: ChangeAvailabilityRequest,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let available = service
        .toggle_availability(req.doc_id.as_deref().unwrap_or_default(), &admin.email)
        .await?;
    Ok(Json(AvailabilityResponse {
        success: true,
        message: "Availability Changed".to_string(),
        available,
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/change-availability",
    request_body = ChangeAvailabilityRequest,
    responses(
        (status = 200, description = "Availability flipped", body = AvailabilityResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse)
    ),
    security(("token" = []), ("Bearer" = []))
)]
async fn change_availability(
    State(service): State<SharedService>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    ApiJson(req): ApiJson<ChangeAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    toggle(&service, &admin, req).await
}

#[utoipa::path(
    post,
    path = "/api/doctor/change-availability",
    request_body = ChangeAvailabilityRequest,
    responses(
        (status = 200, description = "Availability flipped", body = AvailabilityResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse)
    ),
    security(("token" = []), ("Bearer" = []))
)]
async fn doctor_change_availability(
    State(service): State<SharedService>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    ApiJson(req): ApiJson<ChangeAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    toggle(&service, &admin, req).await
}

#[utoipa::path(
    get,
    path = "/api/admin/activity",
    responses(
        (status = 200, description = "Activity log, oldest first", body = ActivityLogResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    ),
    security(("token" = []), ("Bearer" = []))
)]
async fn activity_logs(State(service): State<SharedService>) -> Result<Json<ActivityLogResponse>, ApiError> {
    let logs = service.get_activity_logs().await?;
    Ok(Json(ActivityLogResponse { success: true, logs }))
}

#[utoipa::path(
    get,
    path = "/api/doctor/list",
    responses(
        (status = 200, description = "Public doctor directory", body = DoctorsResponse)
    )
)]
async fn doctor_list(State(service): State<SharedService>) -> Result<Json<DoctorsResponse>, ApiError> {
    let doctors = service.list_doctors_public().await?;
    Ok(Json(DoctorsResponse { success: true, doctors }))
}
