//! 测试公共模块
//! 提供测试配置、内存用户存储与请求辅助函数
#![allow(dead_code)]

use auth_boilerplate::{
    auth::password::PasswordHasher,
    config::{AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig},
    middleware::AppState,
    models::user::{NewUser, RoleType, User},
    repository::{InMemoryUserRepository, UserLookup},
    routes,
};
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use std::sync::Arc;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";
pub const TEST_PASSWORD: &str = "TestPass123";

/// 创建测试配置（低开销的哈希参数）
pub fn create_test_config() -> AppConfig {
    let database_url = std::env::var("TEST_DATABASE_URL").ok().map(Secret::new);

    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
            cors_allowed_origins: "*".to_string(),
        },
        database: DatabaseConfig {
            url: database_url,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_JWT_SECRET.to_string()),
            jwt_expiration_secs: 300,
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_digit: true,
            password_hash_memory_kib: 1024,
            password_hash_iterations: 1,
            password_hash_parallelism: 1,
        },
    }
}

/// 创建使用内存用户存储的应用状态
pub fn create_test_app_state() -> (Arc<AppState>, Arc<InMemoryUserRepository>) {
    let users = Arc::new(InMemoryUserRepository::new());
    let state = AppState::new(create_test_config(), None, users.clone())
        .expect("Failed to create app state");
    (Arc::new(state), users)
}

/// 创建测试路由
pub fn create_test_app() -> (Router, Arc<AppState>, Arc<InMemoryUserRepository>) {
    let (state, users) = create_test_app_state();
    (routes::create_router(state.clone()), state, users)
}

/// 创建测试用户
pub async fn create_test_user(users: &dyn UserLookup, email: &str, password: &str) -> User {
    let hasher = PasswordHasher::from_config(&create_test_config().security)
        .expect("Failed to create hasher");
    let password_hash = hasher.hash(password).expect("Failed to hash password");

    users
        .create(NewUser {
            email: email.to_string(),
            password_hash,
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
            role: RoleType::User,
        })
        .await
        .expect("Failed to create test user")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn bearer_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
