use crate::core::constants::PAYMENT_ORDER_CREATED;
use crate::core::errors::CarebookError;
use crate::core::models::appointment::BookingRequest;
use crate::infrastructure::payments::PaymentOrderRequest;
use crate::tests::{TestContext, create_test_service};
use std::sync::atomic::Ordering;

async fn booked_appointment(ctx: &TestContext) -> (String, String) {
    let (_, user_id) = ctx.register("Asha Patel", "asha@example.com").await;
    let doctor = ctx.add_doctor("meera@example.com").await;
    let appointment = ctx
        .service
        .book_appointment(BookingRequest {
            user_id: user_id.clone(),
            doc_id: doctor.id,
            date: "2024-05-01".to_string(),
            time: "10:00".to_string(),
        })
        .await
        .unwrap();
    (user_id, appointment.id)
}

#[tokio::test]
async fn test_create_payment_order() {
    let ctx = create_test_service();
    let (_, appointment_id) = booked_appointment(&ctx).await;

    let order = ctx.service.create_payment_order(&appointment_id).await.unwrap();
    assert_eq!(order.amount, 50_000);
    assert_eq!(order.currency, "INR");
    assert_eq!(order.receipt.as_deref(), Some(appointment_id.as_str()));

    let requests = ctx.payments.requests.lock().await;
    assert_eq!(
        requests.as_slice(),
        [PaymentOrderRequest {
            amount: 50_000,
            currency: "INR".to_string(),
            receipt: appointment_id.clone(),
            payment_capture: 1,
        }]
    );
    drop(requests);

    let logs = ctx.service.get_activity_logs().await.unwrap();
    assert_eq!(logs.last().unwrap().action, PAYMENT_ORDER_CREATED);
}

#[tokio::test]
async fn test_payment_for_cancelled_appointment_skips_gateway() {
    let ctx = create_test_service();
    let (user_id, appointment_id) = booked_appointment(&ctx).await;
    ctx.service.cancel_appointment(&user_id, &appointment_id).await.unwrap();

    let result = ctx.service.create_payment_order(&appointment_id).await;
    assert!(matches!(result, Err(CarebookError::InvalidState(_))));
    assert_eq!(ctx.payments.calls().await, 0);
}

#[tokio::test]
async fn test_payment_for_unknown_appointment() {
    let ctx = create_test_service();
    let result = ctx.service.create_payment_order("missing").await;
    assert!(matches!(result, Err(CarebookError::InvalidState(_))));

    let blank = ctx.service.create_payment_order("  ").await;
    assert!(matches!(blank, Err(CarebookError::MissingField(_))));
    assert_eq!(ctx.payments.calls().await, 0);
}

#[tokio::test]
async fn test_payment_gateway_failure_surfaces() {
    let ctx = create_test_service();
    let (_, appointment_id) = booked_appointment(&ctx).await;
    ctx.payments.fail.store(true, Ordering::SeqCst);

    let result = ctx.service.create_payment_order(&appointment_id).await;
    assert!(matches!(result, Err(CarebookError::Upstream(_))));
    assert!(
        !ctx.service
            .get_activity_logs()
            .await
            .unwrap()
            .iter()
            .any(|log| log.action == PAYMENT_ORDER_CREATED)
    );
}
