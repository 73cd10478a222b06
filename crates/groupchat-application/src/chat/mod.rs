//! Conversation use cases.
//!
//! - `stream`: `ChatStream`, the live, ordered view of one conversation
//! - `snapshot`: ordering and de-duplication applied to every delivered snapshot
//! - `composer`: `MessageComposer`, validation and submission of outgoing text

mod composer;
mod snapshot;
mod stream;

pub use composer::MessageComposer;
pub use snapshot::order_snapshot;
pub use stream::{ChatStream, LiveMessages, StreamState};
