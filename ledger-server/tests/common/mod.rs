//! Test harness: in-memory (or temp file) database, seeded extension and
//! users, and a router driven with `oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use ledger_server::auth::{JwtConfig, JwtService};
use ledger_server::db::DbService;
use ledger_server::db::repository::{card, customer, extension, user};
use ledger_server::{Config, ServerState, api};
use shared::models::{Card, Customer, CustomerCreate, Extension, User, UserRole};

const TEST_SECRET: &str = "test-secret-with-enough-length-for-hs256-0123456789";

pub struct TestApp {
    pub state: ServerState,
    pub app: Router,
    pub extension: Extension,
    pub admin: User,
    pub clerk: User,
}

impl TestApp {
    /// Single-connection in-memory database
    pub async fn new() -> Self {
        let db = DbService::in_memory().await.unwrap();
        Self::with_db(db, "/tmp/ledger-test").await
    }

    /// File database with a real pool (concurrency tests)
    pub async fn with_file(dir: &std::path::Path) -> Self {
        let url = format!("sqlite:{}/ledger.db", dir.display());
        let db = DbService::new(&url).await.unwrap();
        Self::with_db(db, &dir.display().to_string()).await
    }

    async fn with_db(db: DbService, work_dir: &str) -> Self {
        let jwt = JwtConfig::with_secret(TEST_SECRET);
        let config = Config::with_overrides(work_dir, 0, jwt.clone());
        let state = ServerState::new(config, db.pool, Arc::new(JwtService::with_config(jwt)));

        let extension = extension::create(&state.pool, "Matonge", None).await.unwrap();
        let admin = user::create(&state.pool, "Patron", UserRole::Admin, extension.id)
            .await
            .unwrap();
        let clerk = user::create(&state.pool, "Caissier", UserRole::User, extension.id)
            .await
            .unwrap();

        let app = api::build_app(state.clone());
        Self {
            state,
            app,
            extension,
            admin,
            clerk,
        }
    }

    pub fn token(&self, user: &User) -> String {
        self.state
            .jwt_service
            .generate_token(user.id, &user.name, user.role, user.extension_id)
            .unwrap()
    }

    /// Send a request as `user` (anonymous when `None`)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<&User>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn customer(&self, name: &str, number: &str) -> Customer {
        customer::create(
            &self.state.pool,
            self.extension.id,
            CustomerCreate {
                name: name.to_string(),
                customer_number: number.to_string(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn open_card(&self, customer_id: i64) -> Card {
        card::find_open_by_customer(&self.state.pool, customer_id)
            .await
            .unwrap()
            .unwrap()
    }

    /// Second extension with its own user
    pub async fn other_extension_user(&self) -> User {
        let other = extension::create(&self.state.pool, "Lemba", Some(Decimal::from(30)))
            .await
            .unwrap();
        user::create(&self.state.pool, "Autre", UserRole::Admin, other.id)
            .await
            .unwrap()
    }
}

/// Parse a decimal serialized as a JSON string
pub fn dec(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .unwrap()
}
