//! Permission resolution domain types

mod overrides;
mod repository;
mod role;

pub use overrides::UserPermissionOverrides;
pub use repository::AccessRepository;
pub use role::Role;
