use super::{CarebookService, require};
use crate::core::constants::PAYMENT_ORDER_CREATED;
use crate::core::errors::CarebookError;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::payments::{PaymentOrder, PaymentOrderRequest};
use crate::infrastructure::storage::Storage;
use serde_json::json;
use tracing::info;

/// Major to minor currency units (rupees to paise).
pub fn to_minor_units(amount: f64) -> u64 {
    (amount * 100.0).round() as u64
}

impl<L: LoggingService, S: Storage> CarebookService<L, S> {
    /// Opens a gateway order for the appointment's fee. Cancelled or unknown
    /// appointments are rejected before the gateway is contacted.
    pub async fn create_payment_order(&self, appointment_id: &str) -> Result<PaymentOrder, CarebookError> {
        let appointment_id = require("appointmentId", appointment_id)?;
        let appointment = match self.storage.get_appointment(&appointment_id).await? {
            Some(appointment) if !appointment.cancelled => appointment,
            Some(_) => {
                return Err(CarebookError::InvalidState(format!(
                    "Appointment {} is cancelled",
                    appointment_id
                )));
            }
            None => {
                return Err(CarebookError::InvalidState(format!(
                    "Invalid appointment {}",
                    appointment_id
                )));
            }
        };

        let order = self
            .payments
            .create_order(PaymentOrderRequest {
                amount: to_minor_units(appointment.amount),
                currency: self.settings.currency.clone(),
                receipt: appointment.id.clone(),
                payment_capture: 1,
            })
            .await?;
        info!("Payment order {} created for appointment {}", order.id, appointment.id);

        self.record(
            PAYMENT_ORDER_CREATED,
            json!({ "appointment_id": appointment.id, "order_id": order.id, "amount": order.amount }),
            Some(appointment.user_id.as_str()),
        )
        .await;
        Ok(order)
    }
}
