//! Domain layer for the entitlement `AuthZ` plugin.

mod client;
pub mod grants;
pub mod parser;
pub mod service;

pub use grants::{EntitlementGrants, RoleGrants};
pub use parser::{Entitlement, EntitlementParser, PatternError};
pub use service::Service;
