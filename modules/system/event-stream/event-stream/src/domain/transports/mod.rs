//! Built-in stream transports.

mod log;
mod memory;

pub use log::LogTransport;
pub use memory::InMemoryTransport;
