//! Domain layer for the group `AuthZ` plugin.

mod client;
pub mod matcher;
pub mod policy;
pub mod service;

pub use matcher::match_groups;
pub use policy::{Facet, GroupDescriptor, PolicyDocument, PolicyError, PolicyNode};
pub use service::Service;
