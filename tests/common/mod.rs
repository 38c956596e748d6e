#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use eventos::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@eventos.test";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub router: Router,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.db_path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

pub async fn spawn_app() -> TestApp {
    let db_path =
        std::env::temp_dir().join(format!("eventos-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = "integration-test-secret-with-enough-bytes".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.bootstrap_admin.enabled = true;
    config.security.bootstrap_admin.email = ADMIN_EMAIL.to_string();
    config.security.bootstrap_admin.password = ADMIN_PASSWORD.to_string();

    let state = eventos::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    TestApp {
        router: eventos::api::router(state),
        db_path,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Signs up a client and returns its id.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/usuarios",
                None,
                Some(json!({ "name": name, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn create_category(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/categorias",
                Some(token),
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "category creation failed: {body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn create_event(&self, token: &str, name: &str, category: &str, capacity: i32) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/eventos",
                Some(token),
                Some(json!({
                    "name": name,
                    "description": format!("{name} description"),
                    "start_date": "2099-06-01",
                    "end_date": "2099-06-02",
                    "venue": "Main hall",
                    "capacity": capacity,
                    "category": category,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "event creation failed: {body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn register(&self, token: &str, event_id: i64) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/inscripciones",
            Some(token),
            Some(json!({ "event_id": event_id })),
        )
        .await
    }
}
