use crate::core::errors::CarebookError;
use crate::core::models::{
    appointment::Appointment,
    doctor::Doctor,
    user::{ProfileUpdate, User},
};
use crate::infrastructure::storage::{SlotReservation, Storage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    user_ids_by_email: Arc<RwLock<HashMap<String, String>>>,
    doctors: Arc<RwLock<HashMap<String, Doctor>>>,
    doctor_ids_by_email: Arc<RwLock<HashMap<String, String>>>,
    appointments: Arc<RwLock<HashMap<String, Appointment>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, CarebookError> {
        let mut by_email = self.user_ids_by_email.write().await;
        let key = email_key(&user.email);
        if by_email.contains_key(&key) {
            return Err(CarebookError::EmailAlreadyRegistered(user.email));
        }
        by_email.insert(key, user.id.clone());
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, CarebookError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, CarebookError> {
        let by_email = self.user_ids_by_email.read().await;
        let users = self.users.read().await;
        Ok(by_email.get(&email_key(email)).and_then(|id| users.get(id).cloned()))
    }

    async fn update_user_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Option<User>, CarebookError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(user_id).map(|user| {
            update.apply(user);
            user.clone()
        }))
    }

    async fn create_doctor(&self, doctor: Doctor) -> Result<Doctor, CarebookError> {
        let mut by_email = self.doctor_ids_by_email.write().await;
        let key = email_key(&doctor.email);
        if by_email.contains_key(&key) {
            return Err(CarebookError::EmailAlreadyRegistered(doctor.email));
        }
        by_email.insert(key, doctor.id.clone());
        let mut doctors = self.doctors.write().await;
        doctors.insert(doctor.id.clone(), doctor.clone());
        Ok(doctor)
    }

    async fn get_doctor(&self, doc_id: &str) -> Result<Option<Doctor>, CarebookError> {
        let doctors = self.doctors.read().await;
        Ok(doctors.get(doc_id).cloned())
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, CarebookError> {
        let doctors = self.doctors.read().await;
        let mut all: Vec<Doctor> = doctors.values().cloned().collect();
        all.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn toggle_doctor_availability(&self, doc_id: &str) -> Result<Option<bool>, CarebookError> {
        let mut doctors = self.doctors.write().await;
        Ok(doctors.get_mut(doc_id).map(|doctor| {
            doctor.available = !doctor.available;
            doctor.available
        }))
    }

    async fn reserve_slot(&self, doc_id: &str, date: &str, time: &str) -> Result<SlotReservation, CarebookError> {
        let mut doctors = self.doctors.write().await;
        let Some(doctor) = doctors.get_mut(doc_id) else {
            return Ok(SlotReservation::DoctorNotFound);
        };
        if !doctor.available {
            return Ok(SlotReservation::DoctorUnavailable);
        }
        if doctor.is_slot_booked(date, time) {
            return Ok(SlotReservation::AlreadyBooked);
        }
        doctor
            .slots_booked
            .entry(date.to_string())
            .or_default()
            .push(time.to_string());
        Ok(SlotReservation::Reserved(doctor.clone()))
    }

    async fn release_slot(&self, doc_id: &str, date: &str, time: &str) -> Result<bool, CarebookError> {
        let mut doctors = self.doctors.write().await;
        let doctor = doctors
            .get_mut(doc_id)
            .ok_or_else(|| CarebookError::DoctorNotFound(doc_id.to_string()))?;
        let Some(times) = doctor.slots_booked.get_mut(date) else {
            return Ok(false);
        };
        match times.iter().position(|t| t == time) {
            Some(index) => {
                times.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save_appointment(&self, appointment: Appointment) -> Result<(), CarebookError> {
        let mut appointments = self.appointments.write().await;
        appointments.insert(appointment.id.clone(), appointment);
        Ok(())
    }

    async fn get_appointment(&self, appointment_id: &str) -> Result<Option<Appointment>, CarebookError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.get(appointment_id).cloned())
    }

    async fn list_user_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, CarebookError> {
        let appointments = self.appointments.read().await;
        let mut owned: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn mark_appointment_cancelled(&self, appointment_id: &str) -> Result<bool, CarebookError> {
        let mut appointments = self.appointments.write().await;
        let appointment = appointments
            .get_mut(appointment_id)
            .ok_or_else(|| CarebookError::AppointmentNotFound(appointment_id.to_string()))?;
        if appointment.cancelled {
            return Ok(false);
        }
        appointment.cancelled = true;
        Ok(true)
    }
}
