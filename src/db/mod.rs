use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite, migrate::MigrateDatabase, sqlite::SqlitePoolOptions};
use std::time::Duration;

use crate::error;
use crate::models::{Role, UserSummary};

pub mod user_store;

pub type DbPool = Pool<Sqlite>;

/// Account persistence and credential checks used by the HTTP handlers and
/// the login session
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create an account. Empty fields are rejected, duplicate usernames
    /// fail with `AppError::DuplicateUser`.
    async fn register(&self, username: &str, password: &str, role: Role) -> error::Result<()>;

    /// Role of the user when the password matches. Unknown users and wrong
    /// passwords both yield `None`.
    async fn authenticate(&self, username: &str, password: &str) -> error::Result<Option<Role>>;

    /// Users whose name contains `search`, ordered by role
    async fn list_users(&self, search: Option<&str>) -> error::Result<Vec<UserSummary>>;

    /// Remove a user. Absent ids are a no-op.
    async fn delete_user(&self, id: Option<i64>) -> error::Result<()>;

    async fn count_by_role(&self, role: Role) -> error::Result<i64>;
}

/// Initialize the database connection pool
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    // Create the database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    setup_database(&pool).await?;

    Ok(pool)
}

/// Set up the database schema
async fn setup_database(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL CHECK(role IN ('student', 'teacher', 'admin'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Content tables: created for schema parity, not read or written yet
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            uploaded_by_id INTEGER,
            FOREIGN KEY (uploaded_by_id) REFERENCES users(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quizzes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            document_id INTEGER,
            created_by_id INTEGER,
            FOREIGN KEY (document_id) REFERENCES documents(id),
            FOREIGN KEY (created_by_id) REFERENCES users(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            quiz_id INTEGER NOT NULL,
            question_text TEXT NOT NULL,
            options TEXT,
            correct_answer TEXT NOT NULL,
            FOREIGN KEY (quiz_id) REFERENCES quizzes(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            quiz_id INTEGER NOT NULL,
            score REAL NOT NULL,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (student_id) REFERENCES users(id),
            FOREIGN KEY (quiz_id) REFERENCES quizzes(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use uuid::Uuid;

    use super::{DbPool, init_db_pool, user_store::UserStore};

    /// A throwaway database file with a store on top of it
    pub struct TestDb {
        pub path: PathBuf,
        pub pool: DbPool,
        pub store: UserStore,
    }

    impl TestDb {
        pub async fn new() -> Self {
            let path = std::env::temp_dir().join(format!("tutor_ia_test_{}.db", Uuid::new_v4()));
            let url = format!("sqlite://{}", path.display());
            let pool = init_db_pool(&url, 1)
                .await
                .expect("Failed to initialize database");
            let store = UserStore::new(pool.clone());

            Self { path, pool, store }
        }

        pub async fn teardown(self) {
            self.pool.close().await;
            for suffix in ["", "-wal", "-shm"] {
                let mut file = self.path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::TestDb;

    #[tokio::test]
    async fn schema_contains_all_tables() {
        let db = TestDb::new().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&db.pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();

        assert_eq!(names, ["documents", "questions", "quizzes", "results", "users"]);

        db.teardown().await;
    }

    #[tokio::test]
    async fn role_check_constraint_rejects_unknown_roles() {
        let db = TestDb::new().await;

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, role) VALUES ('x@y.com', 'h', 'alumno')",
        )
        .execute(&db.pool)
        .await;

        assert!(result.is_err());

        db.teardown().await;
    }
}
