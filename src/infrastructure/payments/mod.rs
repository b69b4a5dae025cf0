pub mod razorpay;

use crate::core::errors::CarebookError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PaymentOrderRequest {
    /// Minor currency units (paise for INR).
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    pub payment_capture: u8,
}

/// Order as returned by the gateway. Fields this crate does not model are kept in `extra`
/// so the object can be handed back to clients unchanged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: PaymentOrderRequest) -> Result<PaymentOrder, CarebookError>;
}
