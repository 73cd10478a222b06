//! In-memory adapters.
//!
//! Process-local stand-ins for the remote profile directory, credential
//! provider and document store. They honour the same contracts as the remote
//! services (server-assigned ids and timestamps, full-snapshot pushes) and
//! expose a few switches for simulating outages.

mod clock;
mod credentials;
mod directory;
mod message_store;

pub use clock::{ManualClock, ServerClock, SystemClock};
pub use credentials::InMemoryCredentialProvider;
pub use directory::InMemoryDirectory;
pub use message_store::InMemoryMessageStore;
