use async_trait::async_trait;

use crate::{
    db::{CredentialStore, DbPool},
    error::{AppError, Result},
    models::user::{Role, User, UserSummary},
    services::password::{hash_password, verify_password},
};

/// SQLite-backed credential store
pub struct UserStore {
    pool: DbPool,
}

impl UserStore {
    /// Create a new UserStore with the provided database pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(user)
    }
}

#[async_trait]
impl CredentialStore for UserStore {
    async fn register(&self, username: &str, password: &str, role: Role) -> Result<()> {
        if username.is_empty() {
            return Err(AppError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AppError::MissingField("password"));
        }

        let password_hash = hash_password(password)?;

        // Insert the user, the UNIQUE constraint catches duplicates
        sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?)")
            .bind(username)
            .bind(&password_hash)
            .bind(role)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::DuplicateUser
                }
                other => AppError::Database(other),
            })?;

        tracing::info!("Registered {} as {}", username, role);
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Role>> {
        // Look up the user and check the password
        let role = self
            .get_user_by_username(username)
            .await?
            .filter(|user| verify_password(&user.password_hash, password))
            .map(|user| user.role);

        Ok(role)
    }

    async fn list_users(&self, search: Option<&str>) -> Result<Vec<UserSummary>> {
        let pattern = escape_like(search.unwrap_or_default());

        // LIKE follows SQLite's default collation: ASCII case is ignored
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username, role FROM users
            WHERE username LIKE '%' || ? || '%' ESCAPE '\'
            ORDER BY role, id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(users)
    }

    async fn delete_user(&self, id: Option<i64>) -> Result<()> {
        let id = id.ok_or(AppError::MissingId)?;

        // Delete the user
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            tracing::debug!("Delete of user {} matched no rows", id);
        } else {
            tracing::info!("Deleted user {}", id);
        }

        Ok(())
    }

    async fn count_by_role(&self, role: Role) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(count.0)
    }
}

/// Escape LIKE wildcards so the search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
