//! Password hashing and bearer-token issuance.
//!
//! Passwords are stored as Argon2id PHC strings; access tokens are HS256 JWTs
//! carrying the user's id, email and role.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users::{self, Role};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until expiry
    pub expires_in: i64,
}

pub struct Credentials {
    params: Params,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl Credentials {
    pub fn new(security: &SecurityConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            security.argon2_memory_cost_kib,
            security.argon2_time_cost,
            security.argon2_parallelism,
            None,
        )
        .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;

        let secret = security.jwt_secret.as_bytes();

        Ok(Self {
            params,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_seconds: i64::from(security.token_ttl_minutes) * 60,
        })
    }

    /// Hashes a password with a fresh random salt.
    ///
    /// Argon2 is CPU-heavy, so the work runs on the blocking pool.
    pub async fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let params = self.params.clone();
        let password = password.to_string();

        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| CredentialError::Hashing(e.to_string()))
        })
        .await
        .map_err(|e| CredentialError::Hashing(format!("hashing task failed: {e}")))?
    }

    /// `Ok(false)` on a wrong password, `Err` when the stored digest cannot be parsed.
    pub async fn verify_password(
        &self,
        password: &str,
        digest: &str,
    ) -> Result<bool, CredentialError> {
        let password = password.to_string();
        let digest = digest.to_string();

        task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&digest)
                .map_err(|e| CredentialError::MalformedHash(e.to_string()))?;

            // The PHC string carries its own parameters.
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| CredentialError::Hashing(format!("verification task failed: {e}")))?
    }

    pub fn issue_token(&self, user: &users::Model) -> Result<IssuedToken, CredentialError> {
        self.issue_token_at(user, chrono::Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `issued_at` (Unix seconds).
    pub fn issue_token_at(
        &self,
        user: &users::Model,
        issued_at: i64,
    ) -> Result<IssuedToken, CredentialError> {
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: issued_at,
            exp: issued_at + self.ttl_seconds,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| CredentialError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_seconds,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, CredentialError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected bearer token: {e}");
                CredentialError::InvalidToken
            })
    }
}
