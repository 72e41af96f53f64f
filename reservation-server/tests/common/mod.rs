//! Router test harness: in-memory database, frozen clock

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use reservation_server::core::{Config, ServerState};
use reservation_server::db::DbService;
use reservation_server::utils::FixedClock;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Monday 2030-01-07, 12:00 restaurant time
pub const TODAY: &str = "2030-01-07";
pub const NOW: &str = "12:00";
/// Wednesday
pub const FUTURE_DATE: &str = "2030-01-09";
/// Tuesday
pub const CLOSED_DATE: &str = "2030-01-08";

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = Config::from_lookup(|_| None).unwrap();
        let db = DbService::in_memory().await.unwrap();
        let clock = Arc::new(FixedClock::at(TODAY, NOW).unwrap());
        let state = ServerState::new(config, db, clock);
        let router = reservation_server::api::build_app(state.clone());
        Self { router, state }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, data: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(json!({ "data": data }))).await
    }

    pub async fn put(&self, uri: &str, data: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(json!({ "data": data }))).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None).await
    }

    /// Create a reservation and return its id
    pub async fn create_reservation(&self, people: i64) -> i64 {
        let (status, body) = self
            .post("/reservations", reservation(FUTURE_DATE, "18:00", people))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["reservation_id"].as_i64().unwrap()
    }

    /// Create a table and return its id
    pub async fn create_table(&self, name: &str, capacity: i64) -> i64 {
        let (status, body) = self
            .post("/tables", json!({ "table_name": name, "capacity": capacity }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["table_id"].as_i64().unwrap()
    }
}

pub fn reservation(date: &str, time: &str, people: i64) -> Value {
    json!({
        "first_name": "Rick",
        "last_name": "Sanchez",
        "mobile_number": "202-555-0164",
        "reservation_date": date,
        "reservation_time": time,
        "people": people
    })
}
