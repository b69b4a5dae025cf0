use crate::api::api_routes;
use crate::tests::{TEST_ADMIN_EMAIL, TEST_ADMIN_PASSWORD, TestContext, create_test_service};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "carebook-test-boundary";

fn app(ctx: &TestContext) -> Router {
    api_routes(ctx.service.clone(), 1024 * 1024)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(uri: &str, body: Value, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

fn multipart_request(uri: &str, fields: &[(&str, &str)], image: Option<&[u8]>, headers: &[(&str, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"doc.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder().method("POST").uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "/api/user/register",
            json!({ "name": "Asha Patel", "email": email, "password": "password123" }),
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    body["token"].as_str().unwrap().to_string()
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            "/api/admin/login",
            json!({ "email": TEST_ADMIN_EMAIL, "password": TEST_ADMIN_PASSWORD }),
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn doctor_fields(email: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", "Dr. Meera Rao".to_string()),
        ("email", email.to_string()),
        ("password", "doctor-pass".to_string()),
        ("speciality", "Dermatologist".to_string()),
        ("degree", "MBBS".to_string()),
        ("experience", "4 Years".to_string()),
        ("about", "Treats skin conditions.".to_string()),
        ("fees", "500".to_string()),
        ("address", r#"{"line1":"17th Cross","line2":"Bangalore"}"#.to_string()),
    ]
}

async fn add_doctor(app: &Router, admin: &str, email: &str) -> (StatusCode, Value) {
    let fields = doctor_fields(email);
    let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    send(
        app,
        multipart_request("/api/admin/add-doctor", &fields, Some(&b"\x89PNG"[..]), &[("token", admin)]),
    )
    .await
}

#[tokio::test]
async fn test_booking_flow_over_http() {
    let ctx = create_test_service();
    let app = app(&ctx);
    let user = register(&app, "asha@example.com").await;
    let admin = admin_token(&app).await;

    let (status, body) = add_doctor(&app, &admin, "meera@example.com").await;
    assert_eq!(status, StatusCode::OK);
    let doc_id = body["doctor"]["_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        json_request(
            "/api/user/book-appointment",
            json!({ "docId": doc_id, "slotDate": "2024-05-01", "slotTime": "10:00" }),
            &[("utoken", user.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let appointment_id = body["appointment"]["_id"].as_str().unwrap().to_string();

    // `date`/`time` are accepted as well.
    let (status, body) = send(
        &app,
        json_request(
            "/api/user/book-appointment",
            json!({ "docId": doc_id, "date": "2024-05-01", "time": "10:00" }),
            &[("utoken", user.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "success": false, "message": "Slot already booked" }));

    let (status, body) = send(&app, get_request("/api/user/list-appointments", &[("utoken", user.as_str())])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointments"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        json_request(
            "/api/user/payment-razorpay",
            json!({ "appointmentId": appointment_id }),
            &[("utoken", user.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["amount"], 50_000);

    let (status, _) = send(
        &app,
        json_request(
            "/api/user/cancel-appointment",
            json!({ "appointmentId": appointment_id }),
            &[("utoken", user.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get_request("/api/doctor/list", &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctors"][0]["slots_booked"]["2024-05-01"], json!([]));
    assert!(body["doctors"][0].get("email").is_none());
}

#[tokio::test]
async fn test_user_routes_require_token() {
    let ctx = create_test_service();
    let app = app(&ctx);

    let (status, body) = send(&app, get_request("/api/user/get-profile", &[])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, get_request("/api/user/get-profile", &[("utoken", "garbage")])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = register(&app, "asha@example.com").await;
    let (status, body) = send(&app, get_request("/api/user/get-profile", &[("utoken", user.as_str())])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userData"]["email"], "asha@example.com");
    assert!(body["userData"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_admin_routes_reject_user_tokens() {
    let ctx = create_test_service();
    let app = app(&ctx);
    let user = register(&app, "asha@example.com").await;

    let (status, _) = send(&app, get_request("/api/admin/all-doctors", &[])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get_request("/api/admin/all-doctors", &[("token", user.as_str())])).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        json_request("/api/doctor/change-availability", json!({ "docId": "x" }), &[("utoken", user.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_availability_with_bearer_token() {
    let ctx = create_test_service();
    let app = app(&ctx);
    let admin = admin_token(&app).await;
    let (_, body) = add_doctor(&app, &admin, "meera@example.com").await;
    let doc_id = body["doctor"]["_id"].as_str().unwrap().to_string();
    let bearer = format!("Bearer {}", admin);

    let (status, body) = send(
        &app,
        json_request(
            "/api/doctor/change-availability",
            json!({ "docId": doc_id }),
            &[("authorization", bearer.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    // Scheme names are case-insensitive.
    let lowercase = format!("bearer {}", admin);
    let (status, body) = send(
        &app,
        json_request(
            "/api/doctor/change-availability",
            json!({ "docId": doc_id }),
            &[("authorization", lowercase.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);

    let (status, _) = send(
        &app,
        json_request("/api/admin/change-availability", json!({ "docId": "missing" }), &[("token", admin.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get_request("/api/admin/activity", &[("token", admin.as_str())])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_body_checks() {
    let ctx = create_test_service();
    let app = app(&ctx);
    let user = register(&app, "asha@example.com").await;
    let other_id = {
        let other = register(&app, "ravi@example.com").await;
        ctx.service.authorize_user(&other).unwrap()
    };

    let (status, body) = send(
        &app,
        json_request(
            "/api/user/register",
            json!({ "name": "A", "email": "a@example.com", "password": "password123", "role": "admin" }),
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request(
            "/api/user/book-appointment",
            json!({ "userId": other_id, "docId": "d", "date": "2024-05-01", "time": "10:00" }),
            &[("utoken", user.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        json_request("/api/user/register", json!({ "name": "A", "email": "a@example.com" }), &[]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");
}

#[tokio::test]
async fn test_update_profile_multipart() {
    let ctx = create_test_service();
    let app = app(&ctx);
    let user = register(&app, "asha@example.com").await;

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/user/update-profile",
            &[("name", "Asha P"), ("phone", "9876543210"), ("address", "12 MG Road")],
            Some(&b"\x89PNG"[..]),
            &[("utoken", user.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Asha P");
    assert_eq!(body["user"]["address"]["line1"], "12 MG Road");
    assert!(body["user"]["image"].as_str().unwrap().starts_with("memory://avatars/"));

    let (status, _) = send(
        &app,
        multipart_request("/api/user/update-profile", &[("nickname", "A")], None, &[("utoken", user.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_doctor_without_image() {
    let ctx = create_test_service();
    let app = app(&ctx);
    let admin = admin_token(&app).await;

    let fields = doctor_fields("meera@example.com");
    let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let (status, body) = send(
        &app,
        multipart_request("/api/admin/add-doctor", &fields, None, &[("token", admin.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = add_doctor(&app, &admin, "meera@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctor"]["email"], "meera@example.com");

    let (status, _) = add_doctor(&app, &admin, "meera@example.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
}
