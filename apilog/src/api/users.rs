//! ユーザー管理API
//!
//! `/users` のCRUD操作。リクエストログの記録対象となる業務APIでもある。

use super::error::AppError;
use crate::common::error::ServiceError;
use crate::db::users::{NewUser, User, UserChanges};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

const NAME_MAX_LEN: usize = 100;
const EMAIL_MAX_LEN: usize = 255;
const DEFAULT_LIST_LIMIT: u32 = 100;
const USER_NOT_FOUND: &str = "User Not Found!";

/// ユーザー作成リクエスト
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// メールアドレス
    pub email: String,
}

/// ユーザー更新リクエスト（指定したフィールドのみ更新）
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    /// 名（オプション）
    pub first_name: Option<String>,
    /// 姓（オプション）
    pub last_name: Option<String>,
    /// メールアドレス（オプション）
    pub email: Option<String>,
}

/// ユーザー一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    /// 取得開始位置
    pub offset: Option<u32>,
    /// 取得件数
    pub limit: Option<u32>,
}

fn validate_name(field: &str, value: &str) -> Result<(), ServiceError> {
    let len = value.chars().count();
    if len == 0 || len > NAME_MAX_LEN {
        return Err(ServiceError::Validation(format!(
            "{} must be between 1 and {} characters",
            field, NAME_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), ServiceError> {
    if value.len() > EMAIL_MAX_LEN {
        return Err(ServiceError::Validation(format!(
            "email must be at most {} characters",
            EMAIL_MAX_LEN
        )));
    }
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ServiceError::Validation(
            "email is not a valid email address".to_string(),
        )),
    }
}

impl CreateUserRequest {
    fn validate(self) -> Result<NewUser, ServiceError> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_email(&self.email)?;
        Ok(NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        })
    }
}

impl UpdateUserRequest {
    fn validate(self) -> Result<UserChanges, ServiceError> {
        if let Some(ref first_name) = self.first_name {
            validate_name("first_name", first_name)?;
        }
        if let Some(ref last_name) = self.last_name {
            validate_name("last_name", last_name)?;
        }
        if let Some(ref email) = self.email {
            validate_email(email)?;
        }
        Ok(UserChanges {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        })
    }
}

fn not_found() -> AppError {
    AppError(ServiceError::NotFound(USER_NOT_FOUND.to_string()))
}

/// POST /users - ユーザー作成
///
/// # Returns
/// * `201 Created` - 作成されたユーザー
/// * `400 Bad Request` - 入力値が不正
/// * `409 Conflict` - メールアドレス重複
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let new_user = request.validate()?;
    let user = state.users.create(&new_user).await?;
    tracing::info!(user_id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users - ユーザー一覧取得
///
/// ユーザーが一人もいなければ `204 No Content`
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Response, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let users = state.users.list(limit, query.offset.unwrap_or(0)).await?;
    if users.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(users).into_response())
}

/// GET /users/{user_id} - ユーザー取得
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, AppError> {
    state
        .users
        .get(user_id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// PATCH /users/{user_id} - ユーザー部分更新
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let changes = request.validate()?;
    state
        .users
        .update(user_id, &changes)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /users/{user_id} - ユーザー削除（削除したユーザーを返す）
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = state.users.delete(user_id).await?.ok_or_else(not_found)?;
    tracing::info!(user_id = user.id, "User deleted");
    Ok(Json(user))
}
