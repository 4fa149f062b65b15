use uuid::Uuid;

pub mod call_analyses;
pub mod call_status;
pub mod calls;
pub mod organizations;
pub mod roles;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
