use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::{
        forms::{AddDoctorForm, UpdateProfileForm},
        models::{
            ActivityLogResponse, AppointmentResponse, AppointmentsResponse, AvailabilityResponse,
            BookAppointmentRequest, CancelAppointmentRequest, ChangeAvailabilityRequest, DoctorResponse,
            DoctorsResponse, ErrorResponse, LoginRequest, MessageResponse, PaymentOrderResponse, PaymentRequest,
            ProfileResponse, RegisterRequest, TokenResponse, UpdateProfileResponse,
        },
    },
    core::models::{
        appointment::Appointment,
        audit::AppLog,
        doctor::{DoctorProfile, DoctorSnapshot},
        user::{Address, UserProfile},
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("utoken", SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("utoken"))));
        components.add_security_scheme("token", SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("token"))));
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::register_user,
        super::handlers::login_user,
        super::handlers::get_profile,
        super::handlers::update_profile,
        super::handlers::book_appointment,
        super::handlers::list_appointments,
        super::handlers::cancel_appointment,
        super::handlers::payment_razorpay,
        super::handlers::admin_login,
        super::handlers::add_doctor,
        super::handlers::all_doctors,
        super::handlers::change_availability,
        super::handlers::doctor_change_availability,
        super::handlers::activity_logs,
        super::handlers::doctor_list
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        BookAppointmentRequest,
        CancelAppointmentRequest,
        PaymentRequest,
        ChangeAvailabilityRequest,
        AddDoctorForm,
        UpdateProfileForm,
        TokenResponse,
        MessageResponse,
        ProfileResponse,
        UpdateProfileResponse,
        AppointmentResponse,
        AppointmentsResponse,
        PaymentOrderResponse,
        DoctorResponse,
        DoctorsResponse,
        AvailabilityResponse,
        ActivityLogResponse,
        ErrorResponse,
        Address,
        UserProfile,
        DoctorProfile,
        DoctorSnapshot,
        Appointment,
        AppLog
    )),
    modifiers(&SecurityAddon),
    info(
        title = "Carebook API",
        description = "API for booking doctor appointments, managing doctors and taking payments",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
