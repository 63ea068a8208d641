//! Domain layer for the `AuthZ` resolver.

pub mod error;
pub mod local_client;
pub mod service;
pub mod token;

pub use error::DomainError;
pub use local_client::AuthZResolverLocalClient;
pub use service::Service;
pub use token::TokenValidator;
