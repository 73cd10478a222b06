//! Authentication use cases.

mod gateway;

pub use gateway::AuthGateway;
