// Activity log action names.
pub const USER_REGISTERED: &str = "USER_REGISTERED";
pub const USER_LOGGED_IN: &str = "USER_LOGGED_IN";
pub const PROFILE_UPDATED: &str = "PROFILE_UPDATED";
pub const ADMIN_LOGGED_IN: &str = "ADMIN_LOGGED_IN";
pub const DOCTOR_ADDED: &str = "DOCTOR_ADDED";
pub const AVAILABILITY_CHANGED: &str = "AVAILABILITY_CHANGED";
pub const APPOINTMENT_BOOKED: &str = "APPOINTMENT_BOOKED";
pub const APPOINTMENT_CANCELLED: &str = "APPOINTMENT_CANCELLED";
pub const PAYMENT_ORDER_CREATED: &str = "PAYMENT_ORDER_CREATED";

/// Entries the in-memory activity log retains before dropping the oldest.
pub const MAX_ACTIVITY_LOGS: usize = 10_000;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_TEXT_LENGTH: usize = 2000;
pub const MAX_FEES: f64 = 1_000_000.0;
