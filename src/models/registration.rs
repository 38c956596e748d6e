use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRegistration {
    pub event_id: i32,
    /// Defaults to the caller. Only administrators may register someone else.
    #[serde(default)]
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RegistrationFilter {
    #[serde(default)]
    pub event_id: Option<i32>,
    #[serde(default)]
    pub user_id: Option<i32>,
}
