//! ユーザー管理のDB操作

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::common::error::{ServiceError, ServiceResult};

/// ユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// ユーザーID
    pub id: i64,
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// メールアドレス（一意）
    pub email: String,
}

/// 新規ユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// メールアドレス
    pub email: String,
}

/// 部分更新（`None` のフィールドは変更しない）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// 名
    pub first_name: Option<String>,
    /// 姓
    pub last_name: Option<String>,
    /// メールアドレス
    pub email: Option<String>,
}

fn map_write_error(err: sqlx::Error, action: &str) -> ServiceError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return ServiceError::Conflict("Email already registered".to_string());
        }
    }
    ServiceError::Database(format!("Failed to {}: {}", action, err))
}

/// ユーザーのDB CRUD操作
#[derive(Clone)]
pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    /// 新しいストレージを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// IDでユーザーを取得
    pub async fn get(&self, id: i64) -> ServiceResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, email FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ServiceError::Database(format!("Failed to fetch user: {}", e)))
    }

    /// ユーザー一覧を取得
    pub async fn list(&self, limit: u32, offset: u32) -> ServiceResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, email FROM users ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Database(format!("Failed to list users: {}", e)))
    }

    /// ユーザーを作成
    pub async fn create(&self, user: &NewUser) -> ServiceResult<User> {
        let result = sqlx::query("INSERT INTO users (first_name, last_name, email) VALUES (?, ?, ?)")
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "create user"))?;

        Ok(User {
            id: result.last_insert_rowid(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        })
    }

    /// ユーザーを部分更新。存在しなければ `None`
    pub async fn update(&self, id: i64, changes: &UserChanges) -> ServiceResult<Option<User>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to begin transaction: {}", e)))?;

        let result = sqlx::query(
            "UPDATE users SET
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                email = COALESCE(?, email)
             WHERE id = ?",
        )
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "update user"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, email FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ServiceError::Database(format!("Failed to reload user: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to commit user update: {}", e)))?;

        Ok(Some(user))
    }

    /// ユーザーを削除し、削除したユーザーを返す。存在しなければ `None`
    pub async fn delete(&self, id: i64) -> ServiceResult<Option<User>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to begin transaction: {}", e)))?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, email FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| ServiceError::Database(format!("Failed to fetch user: {}", e)))?;

        let Some(user) = user else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to delete user: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Database(format!("Failed to commit user delete: {}", e)))?;

        Ok(Some(user))
    }
}
