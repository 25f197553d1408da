//! Accounts, credentials and password resets.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use dolist_db::users;
use dolist_types::api::NewUser;
use dolist_types::events::Notification;
use dolist_types::models::User;

use crate::error::{Error, Result, non_empty};
use crate::notifications::Notifier;

pub fn create(conn: &Connection, input: NewUser) -> Result<User> {
    non_empty("username", &input.username)?;
    non_empty("email", &input.email)?;
    non_empty("password", &input.password)?;
    if !input.email.contains('@') {
        return Err(Error::validation("email", "must be an email address"));
    }

    if users::username_taken(conn, &input.username)? {
        return Err(Error::Conflict(format!(
            "username {} is already taken",
            input.username
        )));
    }
    if users::email_taken(conn, &input.email)? {
        return Err(Error::Conflict(format!(
            "email {} is already registered",
            input.email
        )));
    }

    let password_hash = hash_password(&input.password)?;
    let id = users::insert(conn, &input.username, &input.email, &password_hash)?;

    info!("User {} created: {}", id, input.username);
    get_by_id(conn, id)
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<User> {
    users::get_by_id(conn, id)?.ok_or_else(|| Error::not_found("user", id))
}

pub fn get_by_username(conn: &Connection, username: &str) -> Result<User> {
    users::get_by_username(conn, username)?.ok_or_else(|| Error::not_found("user", username))
}

/// Returns the user when the password matches. Unknown users and wrong
/// passwords fail the same way.
pub fn check_credentials(conn: &Connection, username: &str, password: &str) -> Result<User> {
    let Some((user, stored)) = users::get_credentials(conn, username)? else {
        return Err(Error::InvalidCredentials);
    };

    let parsed = PasswordHash::new(&stored)
        .map_err(|e| anyhow::anyhow!("corrupt password hash for user {}: {e}", user.id))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_err()
    {
        warn!("Failed login for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    Ok(user)
}

/// Mails a single-use reset token to the user. Only a hash of the token is
/// stored; when the mail cannot be sent the token is discarded.
pub fn request_password_reset(conn: &Connection, notifier: &Notifier, username: &str) -> Result<()> {
    let user = get_by_username(conn, username)?;
    let token = URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>());

    dolist_db::savepoint(conn, "password_reset", |conn| -> Result<()> {
        users::insert_reset_token(conn, user.id, &hash_token(&token))?;

        let notification = Notification::PasswordResetRequested {
            username: user.username.clone(),
            token: token.clone(),
        };
        notifier.notify(conn, &user, &notification)?;
        Ok(())
    })?;

    info!("Password reset requested for user {}", user.id);
    Ok(())
}

/// Sets a new password using a token from [`request_password_reset`] and
/// consumes the token.
pub fn reset_password(conn: &Connection, token: &str, new_password: &str) -> Result<User> {
    non_empty("password", new_password)?;

    let user_id = dolist_db::savepoint(conn, "reset_password", |conn| -> Result<i64> {
        let user_id = users::take_reset_token(conn, &hash_token(token))?
            .ok_or_else(|| Error::not_found("password reset token", "<redacted>"))?;
        users::update_password(conn, user_id, &hash_password(new_password)?)?;
        Ok(user_id)
    })?;

    info!("Password reset for user {}", user_id);
    get_by_id(conn, user_id)
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
        .to_string();
    Ok(hash)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
