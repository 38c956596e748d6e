pub use super::categories::Entity as Categories;
pub use super::events::Entity as Events;
pub use super::registrations::Entity as Registrations;
pub use super::users::Entity as Users;
