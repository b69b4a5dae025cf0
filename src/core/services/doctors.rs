use super::{
    CarebookService, require, validate_amount_input, validate_email, validate_password, validate_string_input,
};
use crate::core::constants::{AVAILABILITY_CHANGED, DOCTOR_ADDED, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};
use crate::core::errors::{CarebookError, FieldError};
use crate::core::models::doctor::{Doctor, DoctorProfile, NewDoctor, SlotMap};
use crate::core::models::user::Address;
use crate::infrastructure::images::ImageUpload;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

const DOCTOR_FOLDER: &str = "doctors";

impl<L: LoggingService, S: Storage> CarebookService<L, S> {
    /// Onboards a doctor. Every field and the image are required.
    pub async fn add_doctor(
        &self,
        new_doctor: NewDoctor,
        image: Option<ImageUpload>,
        added_by: &str,
    ) -> Result<DoctorProfile, CarebookError> {
        let name = require("name", &new_doctor.name)?;
        let email = require("email", &new_doctor.email)?;
        if new_doctor.password.is_empty() {
            return Err(CarebookError::MissingField("password".to_string()));
        }
        let speciality = require("speciality", &new_doctor.speciality)?;
        let degree = require("degree", &new_doctor.degree)?;
        let experience = require("experience", &new_doctor.experience)?;
        let about = require("about", &new_doctor.about)?;
        let fees = new_doctor
            .fees
            .ok_or_else(|| CarebookError::MissingField("fees".to_string()))?;
        let raw_address = require("address", &new_doctor.address)?;
        let image = image.ok_or_else(|| CarebookError::MissingField("image".to_string()))?;

        validate_email(&email)?;
        validate_password(&new_doctor.password)?;
        validate_string_input("name", &name, MAX_NAME_LENGTH)?;
        validate_string_input("speciality", &speciality, MAX_NAME_LENGTH)?;
        validate_string_input("degree", &degree, MAX_NAME_LENGTH)?;
        validate_string_input("experience", &experience, MAX_NAME_LENGTH)?;
        if about.chars().count() > MAX_TEXT_LENGTH {
            return Err(CarebookError::InvalidInput(
                "about".to_string(),
                FieldError::new(
                    "about",
                    "about Too Long",
                    format!("about cannot exceed {} characters", MAX_TEXT_LENGTH),
                ),
            ));
        }
        validate_amount_input("fees", fees)?;
        let address = Address::normalize(&raw_address);
        if address.is_empty() {
            return Err(CarebookError::MissingField("address".to_string()));
        }

        let password_hash = self.hash_password(&new_doctor.password)?;
        let image_url = self.images.upload(image, DOCTOR_FOLDER).await?;

        let doctor = self
            .storage
            .create_doctor(Doctor {
                id: Uuid::new_v4().to_string(),
                name,
                email,
                password_hash,
                image: image_url,
                speciality,
                degree,
                experience,
                about,
                available: true,
                fees,
                address,
                date: Utc::now(),
                slots_booked: SlotMap::new(),
            })
            .await?;
        info!("Added doctor {} ({})", doctor.id, doctor.speciality);

        self.record(
            DOCTOR_ADDED,
            json!({ "doctor_id": doctor.id, "name": doctor.name, "speciality": doctor.speciality }),
            Some(added_by),
        )
        .await;
        Ok(doctor.profile())
    }

    /// Flips the doctor's `available` flag and returns the new value.
    pub async fn toggle_availability(&self, doc_id: &str, changed_by: &str) -> Result<bool, CarebookError> {
        let doc_id = require("docId", doc_id)?;
        let available = self
            .storage
            .toggle_doctor_availability(&doc_id)
            .await?
            .ok_or_else(|| CarebookError::DoctorNotFound(doc_id.clone()))?;
        info!("Doctor {} availability is now {}", doc_id, available);

        self.record(
            AVAILABILITY_CHANGED,
            json!({ "doctor_id": doc_id, "available": available }),
            Some(changed_by),
        )
        .await;
        Ok(available)
    }

    pub async fn list_doctors(&self) -> Result<Vec<DoctorProfile>, CarebookError> {
        Ok(self.storage.list_doctors().await?.iter().map(Doctor::profile).collect())
    }

    pub async fn list_doctors_public(&self) -> Result<Vec<DoctorProfile>, CarebookError> {
        Ok(self
            .storage
            .list_doctors()
            .await?
            .iter()
            .map(Doctor::public_profile)
            .collect())
    }
}
