//! Authentication: password hashing, token signing and the bearer strategy

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use middleware::{extract_token, jwt_auth_middleware};
pub use password::PasswordHasher;
