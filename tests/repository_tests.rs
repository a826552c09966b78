//! PostgreSQL 用户仓库测试
//! 需要数据库：设置 TEST_DATABASE_URL 后运行 `cargo test -- --ignored`

use auth_boilerplate::{
    db,
    error::AppError,
    models::user::{NewUser, RoleType},
    repository::{UserLookup, UserRepository},
};
use secrecy::ExposeSecret;
use sqlx::PgPool;

mod common;

async fn setup_repo() -> (UserRepository, PgPool) {
    let config = common::create_test_config();
    let url = config
        .database
        .url
        .as_ref()
        .expect("TEST_DATABASE_URL must be set")
        .expose_secret()
        .clone();

    let pool = db::create_pool(&url, &config.database)
        .await
        .expect("Failed to create test database pool");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    sqlx::query("TRUNCATE TABLE users")
        .execute(&pool)
        .await
        .expect("Failed to clean users table");

    (UserRepository::new(pool.clone()), pool)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        first_name: Some("Pg".to_string()),
        last_name: None,
        role: RoleType::Admin,
    }
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_pg_create_and_find() {
    let (repo, _pool) = setup_repo().await;

    let created = repo.create(new_user("pg@example.com")).await.unwrap();
    assert_eq!(created.role, "admin");

    let by_email = repo.find_by_email("PG@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);

    let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "pg@example.com");
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_pg_duplicate_email() {
    let (repo, _pool) = setup_repo().await;

    repo.create(new_user("dup@example.com")).await.unwrap();
    let err = repo.create(new_user("DUP@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::UserAlreadyExists));
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_pg_health_check() {
    let (_repo, pool) = setup_repo().await;
    assert!(db::health_check(&pool).await.is_healthy());
}
