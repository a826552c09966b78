//! 认证服务：凭据校验、令牌签发、请求上下文中的当前用户

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::SecurityConfig,
    context::{ContextKey, RequestContext},
    error::AppError,
    models::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, TokenPayload},
        dto::ToDto,
        user::{NewUser, RoleType, User},
    },
    repository::UserLookup,
};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use std::sync::Arc;
use uuid::Uuid;

/// 请求上下文中当前认证用户的键
pub const AUTH_USER_KEY: ContextKey<User> = ContextKey::new("auth_user");

pub struct AuthService {
    users: Arc<dyn UserLookup>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
    security: SecurityConfig,
    /// 邮箱不存在时用于校验的哈希，使两种失败路径耗时一致
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserLookup>,
        jwt_service: Arc<JwtService>,
        hasher: PasswordHasher,
        security: SecurityConfig,
    ) -> Result<Self, AppError> {
        let filler: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let dummy_hash = hasher.hash(&filler)?;

        Ok(Self {
            users,
            jwt_service,
            hasher,
            security,
            dummy_hash,
        })
    }

    /// 签发访问令牌
    pub fn create_token(&self, user: &User) -> Result<TokenPayload, AppError> {
        Ok(TokenPayload {
            access_token: self.jwt_service.generate_access_token(&user.id)?,
            expires_in: self.jwt_service.expires_in(),
        })
    }

    /// 校验凭据
    ///
    /// 邮箱不存在与密码错误都返回 `UserNotFound`
    pub async fn validate_user(&self, credentials: &LoginRequest) -> Result<User, AppError> {
        let user = self.users.find_by_email(&credentials.email).await?;

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let is_password_valid = self
            .hasher
            .verify_async(credentials.password.clone(), hash)
            .await?;

        match user {
            Some(user) if is_password_valid => Ok(user),
            _ => {
                tracing::info!("Login rejected: invalid credentials");
                Err(AppError::UserNotFound)
            }
        }
    }

    /// 用户登录：校验凭据、绑定上下文并签发令牌
    pub async fn login(
        &self,
        credentials: &LoginRequest,
        ctx: &RequestContext,
    ) -> Result<LoginResponse, AppError> {
        let user = self.validate_user(credentials).await?;
        self.set_auth_user(ctx, user.clone());

        let token = self.create_token(&user)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            token,
            user: user.to_dto(),
        })
    }

    /// 用户注册
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        PasswordHasher::validate_password_policy(&req.password, &self.security)?;

        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let password_hash = self.hasher.hash_async(req.password).await?;

        let user = self
            .users
            .create(NewUser {
                email: req.email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                role: RoleType::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    /// 校验 bearer 令牌并加载对应用户
    pub async fn verify_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.jwt_service.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// 将当前用户绑定到请求上下文
    pub fn set_auth_user(&self, ctx: &RequestContext, user: User) {
        ctx.set(&AUTH_USER_KEY, user);
    }

    /// 读取请求上下文中的当前用户
    pub fn get_auth_user(&self, ctx: &RequestContext) -> Option<User> {
        ctx.get(&AUTH_USER_KEY)
    }
}
