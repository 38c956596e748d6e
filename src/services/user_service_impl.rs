//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::{NewUser, Store, UserChanges};
use crate::entities::users::Role;
use crate::models::{
    CreateUser, UpdateUser, UserCounts, UserDto, check_password, check_person_name,
    normalize_email,
};
use crate::services::credentials::Credentials;
use crate::services::user_service::{UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    credentials: Arc<Credentials>,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, credentials: Arc<Credentials>) -> Self {
        Self { store, credentials }
    }

    async fn ensure_email_free(&self, email: &str, except: Option<i32>) -> Result<(), UserError> {
        if let Some(existing) = self.store.get_user_by_email(email).await?
            && Some(existing.id) != except
        {
            return Err(UserError::EmailTaken(email.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<UserDto>, UserError> {
        let users = self.store.list_users(skip, limit).await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    async fn list_by_role(
        &self,
        role: Role,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<UserDto>, UserError> {
        let users = self.store.list_users_by_role(role, skip, limit).await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    async fn counts(&self) -> Result<UserCounts, UserError> {
        Ok(UserCounts {
            total: self.store.count_users().await?,
            administrators: self.store.count_users_by_role(Role::Administrator).await?,
            clients: self.store.count_users_by_role(Role::Client).await?,
        })
    }

    async fn get(&self, id: i32) -> Result<UserDto, UserError> {
        self.store
            .get_user(id)
            .await?
            .map(UserDto::from)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<UserDto, UserError> {
        let normalized = email.trim().to_lowercase();
        self.store
            .get_user_by_email(&normalized)
            .await?
            .map(UserDto::from)
            .ok_or_else(|| UserError::NotFound(normalized))
    }

    async fn create(&self, input: CreateUser) -> Result<UserDto, UserError> {
        let name = check_person_name(&input.name)?;
        let email = normalize_email(&input.email)?;
        check_password(&input.password)?;

        self.ensure_email_free(&email, None).await?;

        let password_hash = self.credentials.hash_password(&input.password).await?;

        let user = self
            .store
            .create_user(NewUser {
                name,
                email: email.clone(),
                password_hash,
                role: input.role.unwrap_or(Role::Client),
            })
            .await
            .map_err(|e| match UserError::from(e) {
                UserError::EmailTaken(_) => UserError::EmailTaken(email),
                other => other,
            })?;

        Ok(user.into())
    }

    async fn update(&self, id: i32, input: UpdateUser) -> Result<UserDto, UserError> {
        let name = input.name.as_deref().map(check_person_name).transpose()?;
        let email = input.email.as_deref().map(normalize_email).transpose()?;

        if let Some(email) = &email {
            self.ensure_email_free(email, Some(id)).await?;
        }

        let password_hash = match input.password.as_deref() {
            Some(password) => {
                check_password(password)?;
                Some(self.credentials.hash_password(password).await?)
            }
            None => None,
        };

        let changes = UserChanges {
            name,
            email,
            password_hash,
            role: input.role,
        };

        self.store
            .update_user(id, changes)
            .await?
            .map(UserDto::from)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: i32) -> Result<(), UserError> {
        if self.store.delete_user(id).await? {
            Ok(())
        } else {
            Err(UserError::NotFound(id.to_string()))
        }
    }
}
