//! 数据模型模块
//! 实体、DTO 约定与认证请求/响应模型

pub mod auth;
pub mod dto;
pub mod user;
