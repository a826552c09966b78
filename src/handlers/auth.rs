//! 认证相关的 HTTP 处理器

use crate::{
    context::RequestContext,
    error::AppError,
    middleware::AppState,
    models::{
        auth::{LoginRequest, RegisterRequest},
        dto::ToDto,
    },
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let response = state.auth_service.login(&req, &ctx).await?;

    Ok(Json(response))
}

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(user.to_dto())))
}

/// 获取当前用户信息
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .auth_service
        .get_auth_user(&ctx)
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(user.to_dto()))
}
