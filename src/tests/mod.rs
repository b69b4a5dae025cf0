mod api_tests;
mod payment_tests;

use crate::core::errors::CarebookError;
use crate::core::models::{
    appointment::Appointment,
    doctor::{Doctor, DoctorProfile, NewDoctor},
    user::{ProfileUpdate, User},
};
use crate::core::services::{CarebookService, NewUser, ServiceSettings};
use crate::infrastructure::images::{ImageUpload, in_memory::InMemoryImageHost};
use crate::core::models::audit::AppLog;
use crate::infrastructure::logging::{LoggingService, in_memory::InMemoryLogging};
use crate::infrastructure::payments::{PaymentGateway, PaymentOrder, PaymentOrderRequest};
use crate::infrastructure::storage::{SlotReservation, Storage, in_memory::InMemoryStorage};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub const TEST_JWT_SECRET: &str = "test-secret";
pub const TEST_ADMIN_EMAIL: &str = "admin@carebook.test";
pub const TEST_ADMIN_PASSWORD: &str = "admin-password";

/// Records every order request; can be switched into failure mode.
#[derive(Default)]
pub struct FakePaymentGateway {
    pub requests: Mutex<Vec<PaymentOrderRequest>>,
    pub fail: AtomicBool,
}

impl FakePaymentGateway {
    pub async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_order(&self, request: PaymentOrderRequest) -> Result<PaymentOrder, CarebookError> {
        let mut requests = self.requests.lock().await;
        requests.push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(CarebookError::Upstream("gateway down".to_string()));
        }
        Ok(PaymentOrder {
            id: format!("order_{}", requests.len()),
            amount: request.amount,
            currency: request.currency,
            receipt: Some(request.receipt),
            status: Some("created".to_string()),
            extra: serde_json::Map::new(),
        })
    }
}

/// Store whose appointment inserts always fail; everything else is delegated.
pub struct FailingAppointmentStore {
    inner: InMemoryStorage,
}

#[async_trait]
impl Storage for FailingAppointmentStore {
    async fn create_user(&self, user: User) -> Result<User, CarebookError> {
        self.inner.create_user(user).await
    }
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, CarebookError> {
        self.inner.get_user(user_id).await
    }
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, CarebookError> {
        self.inner.get_user_by_email(email).await
    }
    async fn update_user_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Option<User>, CarebookError> {
        self.inner.update_user_profile(user_id, update).await
    }
    async fn create_doctor(&self, doctor: Doctor) -> Result<Doctor, CarebookError> {
        self.inner.create_doctor(doctor).await
    }
    async fn get_doctor(&self, doc_id: &str) -> Result<Option<Doctor>, CarebookError> {
        self.inner.get_doctor(doc_id).await
    }
    async fn list_doctors(&self) -> Result<Vec<Doctor>, CarebookError> {
        self.inner.list_doctors().await
    }
    async fn toggle_doctor_availability(&self, doc_id: &str) -> Result<Option<bool>, CarebookError> {
        self.inner.toggle_doctor_availability(doc_id).await
    }
    async fn reserve_slot(&self, doc_id: &str, date: &str, time: &str) -> Result<SlotReservation, CarebookError> {
        self.inner.reserve_slot(doc_id, date, time).await
    }
    async fn release_slot(&self, doc_id: &str, date: &str, time: &str) -> Result<bool, CarebookError> {
        self.inner.release_slot(doc_id, date, time).await
    }
    async fn save_appointment(&self, _appointment: Appointment) -> Result<(), CarebookError> {
        Err(CarebookError::StorageError("appointment collection unavailable".to_string()))
    }
    async fn get_appointment(&self, appointment_id: &str) -> Result<Option<Appointment>, CarebookError> {
        self.inner.get_appointment(appointment_id).await
    }
    async fn list_user_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, CarebookError> {
        self.inner.list_user_appointments(user_id).await
    }
    async fn mark_appointment_cancelled(&self, appointment_id: &str) -> Result<bool, CarebookError> {
        self.inner.mark_appointment_cancelled(appointment_id).await
    }
}

/// Activity log that rejects writes once `fail` is set.
#[derive(Clone, Default)]
pub struct SwitchableLogging {
    inner: InMemoryLogging,
    pub fail: Arc<AtomicBool>,
}

#[async_trait]
impl LoggingService for SwitchableLogging {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        actor_id: Option<&str>,
    ) -> Result<(), CarebookError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CarebookError::LoggingError("activity log unavailable".to_string()));
        }
        self.inner.log_action(action, details, actor_id).await
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, CarebookError> {
        self.inner.get_logs().await
    }
}

pub struct TestContext<S: Storage = InMemoryStorage, L: LoggingService = InMemoryLogging> {
    pub service: Arc<CarebookService<L, S>>,
    /// Handle onto the same maps the service writes to.
    pub storage: InMemoryStorage,
    pub logging: L,
    pub images: InMemoryImageHost,
    pub payments: Arc<FakePaymentGateway>,
}

pub fn test_settings() -> ServiceSettings {
    ServiceSettings {
        token_ttl: Duration::from_secs(3600),
        admin_email: TEST_ADMIN_EMAIL.to_string(),
        admin_password: TEST_ADMIN_PASSWORD.to_string(),
        currency: "INR".to_string(),
        // Lowest cost bcrypt accepts, keeps the suite fast.
        bcrypt_cost: 4,
    }
}

fn build<S: Storage, L: LoggingService + Clone>(backend: S, storage: InMemoryStorage, logging: L) -> TestContext<S, L> {
    let images = InMemoryImageHost::new();
    let payments = Arc::new(FakePaymentGateway::default());
    let service = CarebookService::new(
        backend,
        logging.clone(),
        Arc::new(images.clone()),
        payments.clone(),
        TEST_JWT_SECRET,
        test_settings(),
    );
    TestContext {
        service: Arc::new(service),
        storage,
        logging,
        images,
        payments,
    }
}

pub fn create_test_service() -> TestContext {
    let storage = InMemoryStorage::new();
    build(storage.clone(), storage, InMemoryLogging::new())
}

pub fn create_failing_appointment_service() -> TestContext<FailingAppointmentStore> {
    let storage = InMemoryStorage::new();
    build(
        FailingAppointmentStore { inner: storage.clone() },
        storage,
        InMemoryLogging::new(),
    )
}

pub fn create_switchable_logging_service() -> TestContext<InMemoryStorage, SwitchableLogging> {
    let storage = InMemoryStorage::new();
    build(storage.clone(), storage, SwitchableLogging::default())
}

pub fn sample_image() -> ImageUpload {
    ImageUpload {
        file_name: "portrait.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    }
}

pub fn sample_doctor(email: &str) -> NewDoctor {
    NewDoctor {
        name: "Dr. Meera Rao".to_string(),
        email: email.to_string(),
        password: "doctor-pass".to_string(),
        speciality: "Dermatologist".to_string(),
        degree: "MBBS".to_string(),
        experience: "4 Years".to_string(),
        about: "Treats skin conditions.".to_string(),
        fees: Some(500.0),
        address: r#"{"line1":"17th Cross","line2":"Richmond, Bangalore"}"#.to_string(),
    }
}

impl<S: Storage, L: LoggingService> TestContext<S, L> {
    /// Registers a user and returns `(token, user_id)`.
    pub async fn register(&self, name: &str, email: &str) -> (String, String) {
        let token = self
            .service
            .register_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        let user_id = self.service.authorize_user(&token).unwrap();
        (token, user_id)
    }

    pub async fn add_doctor(&self, email: &str) -> DoctorProfile {
        self.service
            .add_doctor(sample_doctor(email), Some(sample_image()), TEST_ADMIN_EMAIL)
            .await
            .unwrap()
    }
}
