use std::num::NonZeroU32;

use aws_lc_rs::{pbkdf2, rand};
use base64::{Engine, prelude::BASE64_STANDARD};
use openflights_config::shared::AdminConfig;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};

use crate::db::users::{self, UsersDbError};

/// Identifier stored in front of every password hash.
const PASSWORD_HASH_ALGORITHM: &str = "pbkdf2_sha256";

const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(600_000) {
    Some(iterations) => iterations,
    None => unreachable!(),
};

const SALT_LEN: usize = 16;

const HASH_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Error while generating a password salt")]
    Salt,

    #[error("Error while interacting with the database for the admin account: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    UsersDb(#[from] UsersDbError),
}

/// What [`ensure_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminProvisioning {
    Created,
    Updated,
    /// Credentials were not configured.
    Skipped,
}

/// Creates the configured administrator, or refreshes its password and rights if it exists.
///
/// Missing credentials are logged and skipped rather than treated as a failure.
pub async fn ensure_admin(
    pool: &SqlitePool,
    config: &AdminConfig,
) -> Result<AdminProvisioning, AdminError> {
    let username = config.username.as_deref().filter(|u| !u.trim().is_empty());
    let password = config
        .password
        .as_ref()
        .map(|p| p.expose_secret().as_str())
        .filter(|p| !p.is_empty());

    let (Some(username), Some(password)) = (username, password) else {
        error!("admin username or password is not configured, skipping admin provisioning");
        return Ok(AdminProvisioning::Skipped);
    };

    let password_hash = hash_password(password)?;

    let mut txn = openflights_store::begin_write(pool).await?;
    let provisioning = match users::read_user_by_username(&mut *txn, username).await? {
        Some(user) => {
            users::update_admin(&mut *txn, user.id, &password_hash).await?;
            AdminProvisioning::Updated
        }
        None => {
            users::create_admin(&mut *txn, username, &password_hash).await?;
            AdminProvisioning::Created
        }
    };
    txn.commit().await?;

    match provisioning {
        AdminProvisioning::Created => info!(username, "created admin user"),
        _ => info!(username, "updated admin user, password and rights refreshed"),
    }

    Ok(provisioning)
}

/// Hashes `password` with PBKDF2-HMAC-SHA256 and a random salt.
///
/// The result reads `pbkdf2_sha256$<iterations>$<salt>$<hash>` with base64 salt and hash.
pub fn hash_password(password: &str) -> Result<String, AdminError> {
    let mut salt = [0u8; SALT_LEN];
    rand::fill(&mut salt).map_err(|_| AdminError::Salt)?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ITERATIONS,
        &salt,
        password.as_bytes(),
        &mut hash,
    );

    Ok(format!(
        "{PASSWORD_HASH_ALGORITHM}${PBKDF2_ITERATIONS}${}${}",
        BASE64_STANDARD.encode(salt),
        BASE64_STANDARD.encode(hash)
    ))
}

/// Checks `password` against a hash produced by [`hash_password`] in constant time.
///
/// Malformed hashes never match.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if algorithm != PASSWORD_HASH_ALGORITHM {
        return false;
    }

    let Some(iterations) = iterations.parse::<u32>().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (BASE64_STANDARD.decode(salt), BASE64_STANDARD.decode(hash)) else {
        return false;
    };

    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok()
}
