//! User repository for database operations.

use crate::entities::{ProvisionUserRequest, User};
use crate::types::{UserError, UserResult};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const USER_COLUMNS: &str =
    "id, token_identifier, email, name, image, is_online, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find user by the identity provider's token identifier
    pub async fn find_by_token_identifier(&self, token_identifier: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE token_identifier = ?"
        ))
        .bind(token_identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// List every user in insertion order
    pub async fn list_all(&self) -> UserResult<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY rowid ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        rows.iter().map(user_from_row).collect()
    }

    /// Insert a new user. New accounts start online.
    pub async fn create(&self, request: &ProvisionUserRequest) -> UserResult<User> {
        let now = Utc::now().to_rfc3339();
        let user = User {
            id: cuid2::cuid(),
            token_identifier: request.token_identifier.clone(),
            email: request.email.clone(),
            name: request.name.clone(),
            image: request.image.clone(),
            is_online: true,
            created_at: now.clone(),
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, token_identifier, email, name, image, is_online, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.token_identifier)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image)
        .bind(user.is_online)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                UserError::UserAlreadyExists
            } else {
                UserError::DatabaseError(e.to_string())
            }
        })?;

        Ok(user)
    }

    /// Replace the avatar image of the user with the given token identifier
    pub async fn update_image(&self, token_identifier: &str, image: &str) -> UserResult<()> {
        let result = sqlx::query(
            "UPDATE users SET image = ?, updated_at = ? WHERE token_identifier = ?",
        )
        .bind(image)
        .bind(Utc::now().to_rfc3339())
        .bind(token_identifier)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }
        Ok(())
    }

    /// Set the presence flag of the user with the given token identifier
    pub async fn set_online(&self, token_identifier: &str, is_online: bool) -> UserResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_online = ?, updated_at = ? WHERE token_identifier = ?",
        )
        .bind(is_online)
        .bind(Utc::now().to_rfc3339())
        .bind(token_identifier)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }
        Ok(())
    }

    /// Count all users
    pub async fn count(&self) -> UserResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }
}

fn user_from_row(row: &SqliteRow) -> UserResult<User> {
    let get_err = |e: sqlx::Error| UserError::DatabaseError(e.to_string());

    Ok(User {
        id: row.try_get("id").map_err(get_err)?,
        token_identifier: row.try_get("token_identifier").map_err(get_err)?,
        email: row.try_get("email").map_err(get_err)?,
        name: row.try_get("name").map_err(get_err)?,
        image: row.try_get("image").map_err(get_err)?,
        is_online: row.try_get("is_online").map_err(get_err)?,
        created_at: row.try_get("created_at").map_err(get_err)?,
        updated_at: row.try_get("updated_at").map_err(get_err)?,
    })
}
