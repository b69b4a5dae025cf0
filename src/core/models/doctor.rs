use super::user::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Date key -> reserved time strings, in booking order.
pub type SlotMap = BTreeMap<String, Vec<String>>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub available: bool,
    pub fees: f64,
    pub address: Address,
    pub date: DateTime<Utc>,
    pub slots_booked: SlotMap,
}

impl Doctor {
    pub fn is_slot_booked(&self, date: &str, time: &str) -> bool {
        self.slots_booked
            .get(date)
            .is_some_and(|times| times.iter().any(|t| t == time))
    }

    /// Admin view: everything except the password hash.
    pub fn profile(&self) -> DoctorProfile {
        self.view(Some(self.email.clone()))
    }

    /// Public listing: no password hash, no email.
    pub fn public_profile(&self) -> DoctorProfile {
        self.view(None)
    }

    fn view(&self, email: Option<String>) -> DoctorProfile {
        DoctorProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email,
            image: self.image.clone(),
            speciality: self.speciality.clone(),
            degree: self.degree.clone(),
            experience: self.experience.clone(),
            about: self.about.clone(),
            available: self.available,
            fees: self.fees,
            address: self.address.clone(),
            date: self.date,
            slots_booked: self.slots_booked.clone(),
        }
    }

    pub fn snapshot(&self) -> DoctorSnapshot {
        DoctorSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            speciality: self.speciality.clone(),
            fees: self.fees,
            available: self.available,
            image: self.image.clone(),
            address: self.address.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DoctorProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub available: bool,
    pub fees: f64,
    pub address: Address,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64, example = 1714550400000i64)]
    pub date: DateTime<Utc>,
    #[schema(value_type = Object, example = json!({"2024-05-01": ["10:00", "11:30"]}))]
    pub slots_booked: SlotMap,
}

/// Doctor fields frozen into an appointment at booking time.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DoctorSnapshot {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub speciality: String,
    pub fees: f64,
    pub available: bool,
    pub image: String,
    pub address: Address,
}

#[derive(Clone, Debug, Default)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub password: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: Option<f64>,
    pub address: String,
}
