//! Infrastructure adapters for the group chat core.
//!
//! - `memory`: In-process implementations of the directory, credential
//!   provider and message collection traits
//! - `config`: TOML configuration loading
//! - `telemetry`: tracing subscriber setup

pub mod config;
pub mod memory;
pub mod telemetry;

pub use crate::config::{AuthConfig, ChatConfig, LoggingConfig};
pub use crate::memory::{
    InMemoryCredentialProvider, InMemoryDirectory, InMemoryMessageStore, ManualClock,
    ServerClock, SystemClock,
};
