//! Request and response shapes shared by the services, the HTTP layer and the CLI.

pub mod category;
pub mod event;
pub mod registration;
pub mod stats;
pub mod user;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub use category::{CreateCategory, UpdateCategory};
pub use event::{CreateEvent, EventFilter, EventSlots, UpdateEvent};
pub use registration::{CreateRegistration, RegistrationFilter};
pub use stats::{Dashboard, TopEvent};
pub use user::{CreateUser, UpdateUser, UserCounts, UserDto};

/// Longest accepted category or event name.
pub const MAX_TITLE_LEN: usize = 100;

/// A single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FieldError(pub String);

impl FieldError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trims a category or event name and checks its length.
pub fn check_title(field: &str, value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(FieldError::new(format!(
            "{field} must be {MAX_TITLE_LEN} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims a person's name and checks it is between 2 and 50 characters.
pub fn check_person_name(value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if !(2..=50).contains(&len) {
        return Err(FieldError::new("Name must be between 2 and 50 characters"));
    }
    Ok(trimmed.to_string())
}

/// Lowercases an email address after a basic `local@domain.tld` shape check.
pub fn normalize_email(value: &str) -> Result<String, FieldError> {
    let email = value.trim().to_lowercase();

    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .rsplit_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            && !email.chars().any(char::is_whitespace)
    });

    if !valid || email.len() > 100 {
        return Err(FieldError::new(format!("Invalid email address: {value}")));
    }
    Ok(email)
}

pub fn check_password(value: &str) -> Result<(), FieldError> {
    if value.chars().count() < 8 {
        return Err(FieldError::new("Password must be at least 8 characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        description: Option<Option<String>>,
    }

    #[test]
    fn double_option_tells_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.description, None);

        let null: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let set: Patch = serde_json::from_str(r#"{"description": "Live"}"#).unwrap();
        assert_eq!(set.description, Some(Some("Live".to_string())));
    }

    #[test]
    fn test_check_title() {
        assert_eq!(check_title("Name", "  Music ").unwrap(), "Music");
        assert!(check_title("Name", "").is_err());
        assert!(check_title("Name", "   ").is_err());
        assert!(check_title("Name", &"a".repeat(100)).is_ok());
        assert!(check_title("Name", &"a".repeat(101)).is_err());
    }

    #[test]
    fn test_check_person_name() {
        assert!(check_person_name("Al").is_ok());
        assert!(check_person_name("A").is_err());
        assert!(check_person_name(&"b".repeat(50)).is_ok());
        assert!(check_person_name(&"b".repeat(51)).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email(" Ana.Perez@Example.COM ").unwrap(),
            "ana.perez@example.com"
        );
        assert!(normalize_email("no-at-sign.com").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ana@localhost").is_err());
        assert!(normalize_email("ana@.com").is_err());
        assert!(normalize_email("ana@example.").is_err());
        assert!(normalize_email("a b@example.com").is_err());
        assert!(normalize_email("a@b@example.com").is_err());
    }

    #[test]
    fn test_check_password() {
        assert!(check_password("12345678").is_ok());
        assert!(check_password("1234567").is_err());
    }
}
