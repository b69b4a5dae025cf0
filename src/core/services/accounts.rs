use super::{CarebookService, non_blank, require, validate_email, validate_password, validate_string_input};
use crate::auth::jwt::Role;
use crate::core::constants::{ADMIN_LOGGED_IN, MAX_NAME_LENGTH, PROFILE_UPDATED, USER_LOGGED_IN, USER_REGISTERED};
use crate::core::errors::CarebookError;
use crate::core::models::user::{Address, ProfileUpdate, User, UserProfile};
use crate::infrastructure::images::ImageUpload;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

const AVATAR_FOLDER: &str = "avatars";

#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Requested profile edits. Blank strings are treated like absent fields.
#[derive(Clone, Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub image: Option<ImageUpload>,
}

impl<L: LoggingService, S: Storage> CarebookService<L, S> {
    /// Creates the account and returns a user token for it.
    pub async fn register_user(&self, new_user: NewUser) -> Result<String, CarebookError> {
        let name = require("name", &new_user.name)?;
        let email = require("email", &new_user.email)?;
        if new_user.password.is_empty() {
            return Err(CarebookError::MissingField("password".to_string()));
        }
        validate_email(&email)?;
        validate_password(&new_user.password)?;
        validate_string_input("name", &name, MAX_NAME_LENGTH)?;

        let password_hash = self.hash_password(&new_user.password)?;
        let user = self
            .storage
            .create_user(User::new(Uuid::new_v4().to_string(), name, email, password_hash))
            .await?;
        info!("Registered user {}", user.id);

        self.record(
            USER_REGISTERED,
            json!({ "user_id": user.id, "email": user.email }),
            Some(user.id.as_str()),
        )
        .await;
        self.issue_token(&user.id, Role::User)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, CarebookError> {
        let email = require("email", email)?;
        if password.is_empty() {
            return Err(CarebookError::MissingField("password".to_string()));
        }
        let user = self
            .storage
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| CarebookError::UserNotFound(email.clone()))?;

        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| CarebookError::InternalServerError(format!("Password verification error: {}", e)))?;
        if !matches {
            warn!("Failed login for user {}", user.id);
            return Err(CarebookError::InvalidCredentials);
        }

        self.record(USER_LOGGED_IN, json!({ "user_id": user.id }), Some(user.id.as_str()))
            .await;
        self.issue_token(&user.id, Role::User)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, CarebookError> {
        self.storage
            .get_user(user_id)
            .await?
            .map(|user| user.profile())
            .ok_or_else(|| CarebookError::UserNotFound(user_id.to_string()))
    }

    /// Applies only the supplied fields. A new avatar is uploaded before the record is written.
    pub async fn update_profile(&self, user_id: &str, changes: ProfileChanges) -> Result<UserProfile, CarebookError> {
        let user_id = require("userId", user_id)?;
        if self.storage.get_user(&user_id).await?.is_none() {
            return Err(CarebookError::UserNotFound(user_id));
        }

        let name = non_blank(changes.name);
        if let Some(name) = &name {
            validate_string_input("name", name, MAX_NAME_LENGTH)?;
        }

        let image = match changes.image {
            Some(image) => Some(self.images.upload(image, AVATAR_FOLDER).await?),
            None => None,
        };

        let update = ProfileUpdate {
            name,
            phone: non_blank(changes.phone),
            address: non_blank(changes.address).map(|raw| Address::normalize(&raw)),
            dob: non_blank(changes.dob),
            gender: non_blank(changes.gender),
            image,
        };
        let updated_fields: Vec<&str> = [
            ("name", update.name.is_some()),
            ("phone", update.phone.is_some()),
            ("address", update.address.is_some()),
            ("dob", update.dob.is_some()),
            ("gender", update.gender.is_some()),
            ("image", update.image.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect();

        let user = self
            .storage
            .update_user_profile(&user_id, update)
            .await?
            .ok_or_else(|| CarebookError::UserNotFound(user_id.clone()))?;

        self.record(
            PROFILE_UPDATED,
            json!({ "user_id": user.id, "fields": updated_fields }),
            Some(user.id.as_str()),
        )
        .await;
        Ok(user.profile())
    }

    /// Checks the configured admin credentials and returns an admin token.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<String, CarebookError> {
        if email != self.settings.admin_email || password != self.settings.admin_password {
            warn!("Failed admin login attempt for {}", email);
            return Err(CarebookError::InvalidCredentials);
        }
        self.record(ADMIN_LOGGED_IN, json!({ "email": email }), Some(email)).await;
        self.issue_token(email, Role::Admin)
    }
}
