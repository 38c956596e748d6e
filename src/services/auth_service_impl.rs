//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::Store;
use crate::models::UserDto;
use crate::services::auth_service::{AuthError, AuthService, LoginResult};
use crate::services::credentials::{Claims, Credentials};

pub struct SeaOrmAuthService {
    store: Store,
    credentials: Arc<Credentials>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, credentials: Arc<Credentials>) -> Self {
        Self { store, credentials }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let email = email.trim().to_lowercase();
        let Some(user) = self.store.get_user_by_email(&email).await? else {
            warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let valid = self
            .credentials
            .verify_password(password, &user.password_hash)
            .await?;

        if !valid {
            warn!("Login failed for user #{}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.credentials.issue_token(&user)?;
        info!("User #{} logged in", user.id);

        Ok(LoginResult {
            access_token: issued.token,
            token_type: "bearer",
            expires_in: issued.expires_in,
            user: user.into(),
        })
    }

    async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut claims = self.credentials.validate_token(token)?;

        let Some(user) = self.store.get_user(claims.sub).await? else {
            warn!("Rejected token of missing user #{}", claims.sub);
            return Err(AuthError::UserNotFound);
        };

        claims.role = user.role;
        claims.email = user.email;
        Ok(claims)
    }

    async fn current_user(&self, claims: &Claims) -> Result<UserDto, AuthError> {
        self.store
            .get_user(claims.sub)
            .await?
            .map(UserDto::from)
            .ok_or(AuthError::UserNotFound)
    }
}
