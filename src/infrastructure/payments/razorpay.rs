use crate::config::RazorpayConfig;
use crate::core::errors::CarebookError;
use crate::infrastructure::payments::{PaymentGateway, PaymentOrder, PaymentOrderRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Razorpay Orders API client.
/// POST {base_url}/orders with HTTP basic auth (key id / key secret).
pub struct RazorpayClient {
    client: Client,
    config: RazorpayConfig,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, request: PaymentOrderRequest) -> Result<PaymentOrder, CarebookError> {
        let url = format!("{}/orders", self.config.base_url);
        debug!("Creating Razorpay order: {:?}", request);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&request)
            .send()
            .await
            .map_err(|e| CarebookError::Upstream(format!("Payment gateway unreachable: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CarebookError::Upstream(format!("Failed to read payment gateway response: {}", e)))?;

        if !status.is_success() {
            error!("Razorpay order creation failed: {} - {}", status, body);
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| match (e.error.code, e.error.description) {
                    (Some(code), Some(description)) => Some(format!("{}: {}", code, description)),
                    (None, Some(description)) => Some(description),
                    (Some(code), None) => Some(code),
                    (None, None) => None,
                })
                .unwrap_or(body);
            return Err(CarebookError::Upstream(format!("Payment gateway returned HTTP {}: {}", status, detail)));
        }

        let order: PaymentOrder = serde_json::from_str(&body)
            .map_err(|e| CarebookError::Upstream(format!("Failed to parse payment order: {}", e)))?;
        info!("Created Razorpay order {} for receipt {:?}", order.id, order.receipt);
        Ok(order)
    }
}
