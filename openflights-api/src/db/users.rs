use sqlx::{FromRow, SqliteExecutor};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsersDbError {
    #[error("Error while interacting with the database for users: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

pub async fn read_user_by_username<'c, E>(
    executor: E,
    username: &str,
) -> Result<Option<User>, UsersDbError>
where
    E: SqliteExecutor<'c>,
{
    let user = sqlx::query_as::<_, User>(
        r#"
        select id, username, password_hash, is_staff, is_superuser
        from users
        where username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

/// Creates a staff superuser and returns its id.
pub async fn create_admin<'c, E>(
    executor: E,
    username: &str,
    password_hash: &str,
) -> Result<i64, UsersDbError>
where
    E: SqliteExecutor<'c>,
{
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        insert into users (username, password_hash, is_staff, is_superuser)
        values (?, ?, 1, 1)
        returning id
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

/// Grants staff and superuser rights to an existing user and replaces its password hash.
pub async fn update_admin<'c, E>(
    executor: E,
    id: i64,
    password_hash: &str,
) -> Result<(), UsersDbError>
where
    E: SqliteExecutor<'c>,
{
    sqlx::query(
        r#"
        update users
        set password_hash = ?, is_staff = 1, is_superuser = 1
        where id = ?
        "#,
    )
    .bind(password_hash)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(())
}
