use super::{CarebookService, require};
use crate::core::constants::{APPOINTMENT_BOOKED, APPOINTMENT_CANCELLED};
use crate::core::errors::CarebookError;
use crate::core::models::appointment::{Appointment, BookingRequest};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::{SlotReservation, Storage};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

impl<L: LoggingService, S: Storage> CarebookService<L, S> {
    /// Books `time` on `date` with the doctor.
    ///
    /// Checks run in a fixed order: required fields, doctor exists, doctor available,
    /// user exists, slot free. The last check and the slot append are one conditional
    /// store write, so two concurrent requests cannot both claim the slot.
    pub async fn book_appointment(&self, request: BookingRequest) -> Result<Appointment, CarebookError> {
        let user_id = require("userId", &request.user_id)?;
        let doc_id = require("docId", &request.doc_id)?;
        let date = require("slotDate", &request.date)?;
        let time = require("slotTime", &request.time)?;

        let doctor = self
            .storage
            .get_doctor(&doc_id)
            .await?
            .ok_or_else(|| CarebookError::DoctorNotFound(doc_id.clone()))?;
        if !doctor.available {
            return Err(CarebookError::DoctorUnavailable(doc_id));
        }
        let user = self
            .storage
            .get_user(&user_id)
            .await?
            .ok_or_else(|| CarebookError::UserNotFound(user_id.clone()))?;

        let doctor = match self.storage.reserve_slot(&doc_id, &date, &time).await? {
            SlotReservation::Reserved(doctor) => doctor,
            SlotReservation::AlreadyBooked => {
                debug!("Slot {} {} with doctor {} already taken", date, time, doc_id);
                return Err(CarebookError::SlotConflict { date, time });
            }
            SlotReservation::DoctorUnavailable => return Err(CarebookError::DoctorUnavailable(doc_id)),
            SlotReservation::DoctorNotFound => return Err(CarebookError::DoctorNotFound(doc_id)),
        };

        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            doc_id: doctor.id.clone(),
            slot_date: date.clone(),
            slot_time: time.clone(),
            user_data: user.profile(),
            doc_data: doctor.snapshot(),
            amount: doctor.fees,
            date: Utc::now(),
            cancelled: false,
            payment: false,
            is_completed: false,
        };

        if let Err(e) = self.storage.save_appointment(appointment.clone()).await {
            error!("Saving appointment for slot {} {} failed, releasing reservation: {}", date, time, e);
            if let Err(release_err) = self.storage.release_slot(&doc_id, &date, &time).await {
                error!("Releasing slot {} {} for doctor {} failed: {}", date, time, doc_id, release_err);
            }
            return Err(e);
        }
        info!("Booked appointment {} ({} {} with {})", appointment.id, date, time, doc_id);

        self.record(
            APPOINTMENT_BOOKED,
            json!({
                "appointment_id": appointment.id,
                "doctor_id": doc_id,
                "slot_date": date,
                "slot_time": time,
                "amount": appointment.amount
            }),
            Some(user_id.as_str()),
        )
        .await;
        Ok(appointment)
    }

    pub async fn list_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, CarebookError> {
        let user_id = require("userId", user_id)?;
        self.storage.list_user_appointments(&user_id).await
    }

    /// Cancels the requester's own appointment and frees its slot.
    pub async fn cancel_appointment(&self, user_id: &str, appointment_id: &str) -> Result<Appointment, CarebookError> {
        let appointment_id = require("appointmentId", appointment_id)?;
        let mut appointment = self
            .storage
            .get_appointment(&appointment_id)
            .await?
            .ok_or_else(|| CarebookError::AppointmentNotFound(appointment_id.clone()))?;

        if appointment.user_id != user_id {
            warn!("User {} tried to cancel appointment {} owned by {}", user_id, appointment.id, appointment.user_id);
            return Err(CarebookError::Forbidden(
                "You are not authorized to cancel this appointment".to_string(),
            ));
        }
        if appointment.cancelled || !self.storage.mark_appointment_cancelled(&appointment_id).await? {
            return Err(CarebookError::InvalidState(format!(
                "Appointment {} is already cancelled",
                appointment_id
            )));
        }
        appointment.cancelled = true;

        // The cancellation stands even if freeing the slot fails.
        match self
            .storage
            .release_slot(&appointment.doc_id, &appointment.slot_date, &appointment.slot_time)
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(
                "Slot {} {} was not listed for doctor {}",
                appointment.slot_date, appointment.slot_time, appointment.doc_id
            ),
            Err(e) => error!(
                "Failed to release slot {} {} for doctor {}: {}",
                appointment.slot_date, appointment.slot_time, appointment.doc_id, e
            ),
        }
        info!("Cancelled appointment {}", appointment.id);

        self.record(
            APPOINTMENT_CANCELLED,
            json!({
                "appointment_id": appointment.id,
                "doctor_id": appointment.doc_id,
                "slot_date": appointment.slot_date,
                "slot_time": appointment.slot_time
            }),
            Some(user_id),
        )
        .await;
        Ok(appointment)
    }
}
