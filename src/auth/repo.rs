use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User record. The password hash is nullable: an account whose registration
/// produced no hash (empty password) has no usable credential.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: OffsetDateTime,
}

/// Global admin, a separate identity space from `User`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_super_user: bool,
    pub created_at: OffsetDateTime,
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, phone, password_hash, first_name, last_name,
                   latitude, longitude, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, phone, password_hash, first_name, last_name,
                   latitude, longitude, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, new: NewUser<'_>) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, phone, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, phone, password_hash, first_name, last_name,
                      latitude, longitude, created_at
            "#,
        )
        .bind(new.email)
        .bind(new.phone)
        .bind(new.password_hash)
        .bind(new.first_name)
        .bind(new.last_name)
        .fetch_one(db)
        .await
    }

    pub async fn update_position(
        db: &PgPool,
        id: i64,
        latitude: f64,
        longitude: f64,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET latitude = $2, longitude = $3 WHERE id = $1")
            .bind(id)
            .bind(latitude)
            .bind(longitude)
            .execute(db)
            .await?;
        Ok(())
    }
}

impl Admin {
    pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, username, password_hash, is_super_user, created_at
            FROM admins
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, username, password_hash, is_super_user, created_at
            FROM admins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }
}
