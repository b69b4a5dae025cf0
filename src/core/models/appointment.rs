use super::{doctor::DoctorSnapshot, user::UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub doc_id: String,
    pub slot_date: String,
    pub slot_time: String,
    pub user_data: UserProfile,
    pub doc_data: DoctorSnapshot,
    pub amount: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64, example = 1714550400000i64)]
    pub date: DateTime<Utc>,
    pub cancelled: bool,
    pub payment: bool,
    pub is_completed: bool,
}

#[derive(Clone, Debug, Default)]
pub struct BookingRequest {
    pub user_id: String,
    pub doc_id: String,
    pub date: String,
    pub time: String,
}
