pub mod credentials;
pub use credentials::{Claims, CredentialError, Credentials};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod category_service;
pub mod category_service_impl;
pub use category_service::{CategoryError, CategoryService};
pub use category_service_impl::SeaOrmCategoryService;

pub mod event_service;
pub mod event_service_impl;
pub use event_service::{EventError, EventService};
pub use event_service_impl::SeaOrmEventService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod registration_service;
pub mod registration_service_impl;
pub use registration_service::{RegistrationError, RegistrationService};
pub use registration_service_impl::SeaOrmRegistrationService;

pub mod stats_service;
pub mod stats_service_impl;
pub use stats_service::{StatsError, StatsService};
pub use stats_service_impl::SeaOrmStatsService;
