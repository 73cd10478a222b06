use std::collections::HashSet;

use groupchat_core::conversation::Message;

/// Puts a delivered snapshot into display order: newest `created_at` first,
/// each message id at most once.
///
/// The sort is stable, so messages sharing a timestamp keep the order the
/// backing store delivered them in. When an id repeats, its first occurrence
/// in that order is kept.
pub fn order_snapshot(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut seen = HashSet::with_capacity(messages.len());
    messages.retain(|message| seen.insert(message.id.clone()));
    messages
}
