//! # Authentication Module
//!
//! Password hashing for tutor accounts and bearer-token authentication for
//! the tutor API.
//!
//! Passwords are hashed with Argon2 (random salt, PHC string format). Login
//! issues an opaque random token that the tutor sends back as
//! `Authorization: Bearer <token>`; [`CurrentTutor`] resolves it on each
//! request.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::Response,
};
use eyre::{eyre, Result};
use rand::{distributions::Alphanumeric, Rng};
use tutorbook_core::{errors::TutorError, models::tutor::Tutor};

use crate::{middleware::error_handling::map_error, ApiState};

const TOKEN_LENGTH: usize = 48;

/// Hashes a password using the Argon2 algorithm
///
/// # Example
///
/// ```ignore
/// let hashed = hash_password("correct horse battery staple")?;
/// assert!(verify_password(&hashed, "correct horse battery staple")?);
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks `password` against a stored PHC hash. A malformed hash is an error,
/// a wrong password is `Ok(false)`.
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| eyre!("Invalid password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn generate_api_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The tutor behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentTutor(pub Tutor);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentTutor {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            map_error(TutorError::Authentication("Missing bearer token".to_string()))
        })?;

        let tutor = state
            .store
            .tutor_by_token(token.to_string())
            .await
            .map_err(|err| map_error(TutorError::Database(err)))?
            .ok_or_else(|| {
                map_error(TutorError::Authentication("Invalid or expired token".to_string()))
            })?;

        Ok(CurrentTutor(tutor))
    }
}
