use crate::core::errors::CarebookError;
use crate::core::models::{
    appointment::Appointment,
    doctor::Doctor,
    user::{ProfileUpdate, User},
};
use async_trait::async_trait;

/// Outcome of an atomic slot reservation.
#[derive(Debug, Clone)]
pub enum SlotReservation {
    /// The slot was appended; carries the doctor as it was when the slot was taken.
    Reserved(Doctor),
    AlreadyBooked,
    DoctorUnavailable,
    DoctorNotFound,
}

/// Document store for users, doctors and appointments.
///
/// `reserve_slot` and `toggle_doctor_availability` must be single atomic
/// conditional writes: the check and the mutation happen under one guard.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fails with `EmailAlreadyRegistered` when the email index already holds the address.
    async fn create_user(&self, user: User) -> Result<User, CarebookError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, CarebookError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, CarebookError>;
    async fn update_user_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Option<User>, CarebookError>;

    async fn create_doctor(&self, doctor: Doctor) -> Result<Doctor, CarebookError>;
    async fn get_doctor(&self, doc_id: &str) -> Result<Option<Doctor>, CarebookError>;
    async fn list_doctors(&self) -> Result<Vec<Doctor>, CarebookError>;
    async fn toggle_doctor_availability(&self, doc_id: &str) -> Result<Option<bool>, CarebookError>;
    async fn reserve_slot(&self, doc_id: &str, date: &str, time: &str) -> Result<SlotReservation, CarebookError>;
    /// Removes one matching entry. `Ok(false)` when the time was not listed.
    async fn release_slot(&self, doc_id: &str, date: &str, time: &str) -> Result<bool, CarebookError>;

    async fn save_appointment(&self, appointment: Appointment) -> Result<(), CarebookError>;
    async fn get_appointment(&self, appointment_id: &str) -> Result<Option<Appointment>, CarebookError>;
    async fn list_user_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, CarebookError>;
    /// Flips `cancelled` to true. `Ok(false)` when it was already cancelled.
    async fn mark_appointment_cancelled(&self, appointment_id: &str) -> Result<bool, CarebookError>;
}

pub mod in_memory;
