//! User domain models

use super::dto::{AbstractDto, ToDto};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User account
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String, // user, admin
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// password_hash stays out of logs
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Role enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    User,
    Admin,
}

impl From<String> for RoleType {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => RoleType::Admin,
            _ => RoleType::User,
        }
    }
}

impl From<RoleType> for String {
    fn from(role: RoleType) -> Self {
        match role {
            RoleType::User => "user".to_string(),
            RoleType::Admin => "admin".to_string(),
        }
    }
}

/// New user to persist; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: RoleType,
}

/// User response (without sensitive data)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(flatten)]
    pub base: AbstractDto,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: RoleType,
}

impl ToDto for User {
    type Dto = UserDto;

    fn to_dto(&self) -> UserDto {
        UserDto {
            base: AbstractDto {
                id: self.id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: RoleType::from(self.role.clone()),
        }
    }
}
