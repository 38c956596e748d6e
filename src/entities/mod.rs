pub mod prelude;

pub mod categories;
pub mod events;
pub mod registrations;
pub mod users;
