mod accounts;
mod booking;
mod doctors;
mod payments;

pub use accounts::{NewUser, ProfileChanges};
pub use payments::to_minor_units;

use crate::auth::jwt::{JwtService, Role};
use crate::config::Config;
use crate::core::constants::{MAX_FEES, MIN_PASSWORD_LENGTH};
use crate::core::errors::{CarebookError, FieldError};
use crate::core::models::audit::AppLog;
use crate::infrastructure::images::ImageHost;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::payments::PaymentGateway;
use crate::infrastructure::storage::Storage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").expect("valid email pattern"));

/// Settings the workflows read at runtime, lifted out of [`Config`].
#[derive(Clone, Debug)]
pub struct ServiceSettings {
    pub token_ttl: Duration,
    pub admin_email: String,
    pub admin_password: String,
    pub currency: String,
    pub bcrypt_cost: u32,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        ServiceSettings {
            token_ttl: Duration::from_secs(config.token_ttl_secs),
            admin_email: config.admin_email.clone(),
            admin_password: config.admin_password.clone(),
            currency: config.currency.clone(),
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

pub struct CarebookService<L: LoggingService, S: Storage> {
    storage: S,
    logging: L,
    images: Arc<dyn ImageHost>,
    payments: Arc<dyn PaymentGateway>,
    jwt_service: JwtService,
    settings: ServiceSettings,
}

impl<L: LoggingService, S: Storage> CarebookService<L, S> {
    pub fn new(
        storage: S,
        logging: L,
        images: Arc<dyn ImageHost>,
        payments: Arc<dyn PaymentGateway>,
        jwt_secret: &str,
        settings: ServiceSettings,
    ) -> Self {
        CarebookService {
            storage,
            logging,
            images,
            payments,
            jwt_service: JwtService::new(jwt_secret),
            settings,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt_service
    }

    /// User policy: any valid user token. Yields the user record id.
    pub fn authorize_user(&self, token: &str) -> Result<String, CarebookError> {
        let claims = self.jwt_service.verify_token(token)?;
        if claims.role != Role::User {
            return Err(CarebookError::InvalidToken("not a user token".to_string()));
        }
        Ok(claims.sub)
    }

    /// Admin policy: a valid admin token whose subject is exactly the configured admin email.
    pub fn authorize_admin(&self, token: &str) -> Result<String, CarebookError> {
        let claims = self.jwt_service.verify_token(token)?;
        if claims.role != Role::Admin || claims.sub != self.settings.admin_email {
            return Err(CarebookError::Forbidden("Unauthorized".to_string()));
        }
        Ok(claims.sub)
    }

    pub async fn get_activity_logs(&self) -> Result<Vec<AppLog>, CarebookError> {
        self.logging.get_logs().await
    }

    /// Appends to the activity log. Runs after the workflow's writes have been
    /// committed, so a failure here is logged and never returned to the caller.
    async fn record(&self, action: &str, details: serde_json::Value, actor_id: Option<&str>) {
        debug!("{} by {:?}", action, actor_id);
        if let Err(e) = self.logging.log_action(action, details, actor_id).await {
            error!("Failed to record {} by {:?}: {}", action, actor_id, e);
        }
    }

    fn issue_token(&self, subject: &str, role: Role) -> Result<String, CarebookError> {
        self.jwt_service.issue_token(subject, role, self.settings.token_ttl)
    }

    fn hash_password(&self, password: &str) -> Result<String, CarebookError> {
        bcrypt::hash(password, self.settings.bcrypt_cost)
            .map_err(|e| CarebookError::InternalServerError(format!("Password hashing error: {}", e)))
    }
}

/// Trimmed value of a required field; blank counts as missing.
fn require(field: &str, value: &str) -> Result<String, CarebookError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CarebookError::MissingField(field.to_string()));
    }
    Ok(trimmed.to_string())
}

/// `Some(trimmed)` for non-blank input, `None` otherwise.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_email(email: &str) -> Result<(), CarebookError> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(CarebookError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CarebookError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CarebookError::InvalidInput(
            "password".to_string(),
            FieldError::new(
                "password",
                "Password Too Short",
                format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            ),
        ));
    }
    Ok(())
}

fn validate_string_input(field: &str, value: &str, max_length: usize) -> Result<(), CarebookError> {
    if value.chars().count() > max_length {
        return Err(CarebookError::InvalidInput(
            field.to_string(),
            FieldError::new(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ),
        ));
    }
    if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
        return Err(CarebookError::InvalidInput(
            field.to_string(),
            FieldError::new(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ),
        ));
    }
    Ok(())
}

fn validate_amount_input(field: &str, amount: f64) -> Result<(), CarebookError> {
    let invalid = |title: &str, description: &str| {
        CarebookError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    };
    if !amount.is_finite() {
        return Err(invalid("Invalid Amount", "Amount must be a finite number"));
    }
    if amount <= 0.0 {
        return Err(invalid("Invalid Amount", "Amount must be greater than 0"));
    }
    if amount > MAX_FEES {
        return Err(invalid("Amount Too Large", "Amount cannot exceed 1,000,000"));
    }
    if ((amount * 100.0).round() - amount * 100.0).abs() > 1e-6 {
        return Err(invalid("Invalid Amount", "Amount cannot have more than 2 decimal places"));
    }
    Ok(())
}
