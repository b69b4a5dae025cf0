use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_AVATAR: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";
pub const NOT_SELECTED: &str = "Not Selected";
pub const DEFAULT_PHONE: &str = "0000000000";

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Address {
    pub line1: String,
    pub line2: String,
}

impl Address {
    /// Accepts either a JSON object (`{"line1": .., "line2": ..}`) or free text.
    /// Free text lands in `line1`.
    pub fn normalize(raw: &str) -> Address {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
                let line = |key: &str| value.get(key).and_then(|v| v.as_str()).unwrap_or_default().trim().to_string();
                return Address {
                    line1: line("line1"),
                    line2: line("line2"),
                };
            }
        }
        Address {
            line1: trimmed.to_string(),
            line2: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.line1.is_empty() && self.line2.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: String,
    pub phone: String,
    pub address: Address,
    pub gender: String,
    pub dob: String,
}

impl User {
    pub fn new(id: String, name: String, email: String, password_hash: String) -> Self {
        User {
            id,
            name,
            email,
            password_hash,
            image: DEFAULT_AVATAR.to_string(),
            phone: DEFAULT_PHONE.to_string(),
            address: Address::default(),
            gender: NOT_SELECTED.to_string(),
            dob: NOT_SELECTED.to_string(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            image: self.image.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            gender: self.gender.clone(),
            dob: self.dob.clone(),
        }
    }
}

/// Password-free view of a user. Also embedded in appointments as a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: String,
    pub phone: String,
    pub address: Address,
    pub gender: String,
    pub dob: String,
}

/// Partial profile update; `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub image: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(address) = self.address {
            user.address = address;
        }
        if let Some(dob) = self.dob {
            user.dob = dob;
        }
        if let Some(gender) = self.gender {
            user.gender = gender;
        }
        if let Some(image) = self.image {
            user.image = image;
        }
    }
}
