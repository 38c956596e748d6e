//! `SeaORM` implementation of the `RegistrationService` trait.

use async_trait::async_trait;
use tracing::warn;

use crate::db::{Admission, RegistrationListFilter, Store};
use crate::entities::registrations;
use crate::models::{CreateRegistration, RegistrationFilter};
use crate::services::credentials::Claims;
use crate::services::registration_service::{RegistrationError, RegistrationService};

pub struct SeaOrmRegistrationService {
    store: Store,
}

impl SeaOrmRegistrationService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn owned(
        &self,
        caller: &Claims,
        id: i32,
    ) -> Result<registrations::Model, RegistrationError> {
        let registration = self
            .store
            .get_registration(id)
            .await?
            .ok_or(RegistrationError::NotFound(id))?;

        if !caller.is_admin() && registration.user_id != caller.sub {
            return Err(RegistrationError::Forbidden(
                "You can only access your own registrations".to_string(),
            ));
        }

        Ok(registration)
    }
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("registrations_total", "outcome" => outcome).increment(1);
}

#[async_trait]
impl RegistrationService for SeaOrmRegistrationService {
    async fn list(
        &self,
        caller: &Claims,
        filter: RegistrationFilter,
    ) -> Result<Vec<registrations::Model>, RegistrationError> {
        let user_id = if caller.is_admin() {
            filter.user_id
        } else {
            match filter.user_id {
                Some(other) if other != caller.sub => {
                    return Err(RegistrationError::Forbidden(
                        "You can only list your own registrations".to_string(),
                    ));
                }
                _ => Some(caller.sub),
            }
        };

        let registrations = self
            .store
            .list_registrations(RegistrationListFilter {
                event_id: filter.event_id,
                user_id,
            })
            .await?;

        Ok(registrations)
    }

    async fn get(
        &self,
        caller: &Claims,
        id: i32,
    ) -> Result<registrations::Model, RegistrationError> {
        self.owned(caller, id).await
    }

    async fn register(
        &self,
        caller: &Claims,
        input: CreateRegistration,
    ) -> Result<registrations::Model, RegistrationError> {
        let user_id = input.user_id.unwrap_or(caller.sub);
        if user_id != caller.sub && !caller.is_admin() {
            return Err(RegistrationError::Forbidden(
                "Only administrators can register other users".to_string(),
            ));
        }

        let event_id = input.event_id;
        let today = chrono::Utc::now().date_naive();

        let admission = self
            .store
            .admit_registration(event_id, user_id, today)
            .await
            .map_err(|e| {
                // Two concurrent requests for the same pair race past the duplicate check.
                if crate::db::is_unique_violation(&e) {
                    RegistrationError::AlreadyRegistered { event_id, user_id }
                } else {
                    RegistrationError::from(e)
                }
            });

        let result = match admission {
            Ok(Admission::Admitted(registration)) => Ok(registration),
            Ok(Admission::EventNotFound) => Err(RegistrationError::EventNotFound(event_id)),
            Ok(Admission::UserNotFound) => Err(RegistrationError::UserNotFound(user_id)),
            Ok(Admission::AlreadyRegistered) => {
                Err(RegistrationError::AlreadyRegistered { event_id, user_id })
            }
            Ok(Admission::Full) => Err(RegistrationError::CapacityExceeded(event_id)),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => record_outcome("admitted"),
            Err(RegistrationError::CapacityExceeded(_)) => {
                warn!("Rejected registration of user #{user_id}: event #{event_id} is full");
                record_outcome("capacity_exceeded");
            }
            Err(RegistrationError::AlreadyRegistered { .. }) => record_outcome("duplicate"),
            Err(RegistrationError::EventNotFound(_) | RegistrationError::UserNotFound(_)) => {
                record_outcome("not_found");
            }
            Err(_) => record_outcome("error"),
        }

        result
    }

    async fn cancel(&self, caller: &Claims, id: i32) -> Result<(), RegistrationError> {
        self.owned(caller, id).await?;

        if self.store.delete_registration(id).await? {
            Ok(())
        } else {
            Err(RegistrationError::NotFound(id))
        }
    }
}
