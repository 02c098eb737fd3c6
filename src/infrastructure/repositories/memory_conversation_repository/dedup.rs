use crate::domain::models::message::{IncomingMessage, MessageRecord};

use super::store::ConversationStore;

/// How an incoming message was classified against existing history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Disposition {
    /// Appended as a new history entry
    Appended,
    /// Matched a stored message by id
    IdMatch,
    /// Same text as the newest message inside the duplicate window
    RecentRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct DedupOutcome {
    pub disposition: Disposition,
    /// The history itself changed (append or merge)
    pub content_changed: bool,
    /// Group name or action reference changed
    pub metadata_changed: bool,
}

impl DedupOutcome {
    pub(super) fn new_entry(&self) -> bool {
        self.disposition == Disposition::Appended
    }

    pub(super) fn should_notify(&self) -> bool {
        self.content_changed || self.metadata_changed
    }
}

/// Classify `incoming` against the history of `conversation_id` and apply the
/// resulting mutation.
///
/// Rules, first match wins:
/// 1. the incoming id matches a stored message: merge late sticker/icon refs in place
/// 2. no incoming id, the newest message has the same text and arrived less than
///    `duplicate_window_millis` before `now`: merge a late icon in place
/// 3. otherwise append a new record stamped with `now`
///
/// Metadata (group name, action reference) is applied first, unconditionally.
pub(super) fn apply(
    store: &mut ConversationStore,
    conversation_id: &str,
    incoming: &IncomingMessage,
    now: i64,
    duplicate_window_millis: i64,
) -> DedupOutcome {
    store.touch(conversation_id);

    let group_changed = store.set_group_name(conversation_id, incoming.group_name.as_deref());
    let action_changed = store.set_action_ref(conversation_id, incoming.action_ref.as_ref());
    let metadata_changed = group_changed || action_changed;

    if let Some(message_id) = incoming.id.as_deref() {
        if let Some(index) = store.find_by_id(conversation_id, message_id) {
            let content_changed = merge_at(store, conversation_id, index, |record| {
                // Both merges must run, so no short-circuit here.
                record.merge_icon(incoming.icon_ref.as_ref())
                    | record.merge_sticker(incoming.sticker_ref.as_ref())
            });
            return DedupOutcome {
                disposition: Disposition::IdMatch,
                content_changed,
                metadata_changed,
            };
        }
    } else if let Some((index, last)) = store.last_message(conversation_id) {
        let elapsed = now - last.timestamp;
        if last.text == incoming.text && elapsed < duplicate_window_millis {
            let content_changed = merge_at(store, conversation_id, index, |record| {
                record.merge_icon(incoming.icon_ref.as_ref())
            });
            return DedupOutcome {
                disposition: Disposition::RecentRepeat,
                content_changed,
                metadata_changed,
            };
        }
    }

    store.append_message(conversation_id, MessageRecord::from_incoming(incoming, now));
    DedupOutcome {
        disposition: Disposition::Appended,
        content_changed: true,
        metadata_changed,
    }
}

fn merge_at(
    store: &mut ConversationStore,
    conversation_id: &str,
    index: usize,
    merge: impl FnOnce(&mut MessageRecord) -> bool,
) -> bool {
    let Some(mut record) = store.message_at(conversation_id, index).cloned() else {
        return false;
    };

    if !merge(&mut record) {
        return false;
    }

    store.replace_message_at(conversation_id, index, record);
    true
}
