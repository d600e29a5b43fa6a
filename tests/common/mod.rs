#![allow(dead_code)]

use actix_web::{body::MessageBody, dev::ServiceResponse, test, web};
use serde_json::{json, Value};
use taskforge::config::Config;
use taskforge::{db, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test config")
}

/// Fresh in-memory database with the schema applied.
pub async fn test_state() -> web::Data<AppState> {
    let config = test_config();
    let pool = db::connect(&config.database_url, 1)
        .await
        .expect("Failed to open in-memory database");
    web::Data::new(AppState::new(pool, &config))
}

pub struct TestUser {
    pub id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub async fn read_json<B: MessageBody>(resp: ServiceResponse<B>) -> (u16, Value) {
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn register_and_login<S, B>(app: &S, name: &str) -> TestUser
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "name": name,
            "email": format!("{}@example.com", name),
            "password": "pw"
        }))
        .to_request();
    let (status, body) = read_json(test::call_service(app, req).await).await;
    assert_eq!(status, 200, "register {} failed: {}", name, body);
    let id = body["data"]["id"].as_i64().expect("user id in register response");

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "name": name, "password": "pw" }))
        .to_request();
    let (status, body) = read_json(test::call_service(app, req).await).await;
    assert_eq!(status, 200, "login {} failed: {}", name, body);

    TestUser {
        id,
        access_token: body["access_token"].as_str().unwrap().to_string(),
        refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
    }
}

pub async fn create_task<S, B>(app: &S, user: &TestUser, title: &str) -> Value
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&user.access_token))
        .set_json(json!({ "title": title, "description": "d" }))
        .to_request();
    let (status, body) = read_json(test::call_service(app, req).await).await;
    assert_eq!(status, 200, "create task failed: {}", body);
    body["data"].clone()
}
