use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, Mutex};

use crate::domain::models::message::MessageRecord;
use crate::domain::repositories::conversation_repository::MessageFeed;

use super::store::ConversationStore;

/// Change notification bus shared by every conversation.
///
/// Tokens only name the conversation that changed; subscribers re-read the store.
/// Publishing never waits: with no subscriber the token is dropped, and a subscriber
/// that falls more than the buffer size behind loses the oldest tokens and resyncs
/// from a fresh snapshot.
pub(super) struct ChangeBus {
    sender: broadcast::Sender<String>,
}

impl ChangeBus {
    pub(super) fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self { sender }
    }

    pub(super) fn publish(&self, conversation_id: &str) {
        match self.sender.send(conversation_id.to_string()) {
            Ok(receivers) => {
                tracing::trace!("Published change for {} to {} feed(s)", conversation_id, receivers);
            }
            Err(_) => {
                tracing::trace!("No feed subscribed, change for {} dropped", conversation_id);
            }
        }
    }

    pub(super) fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }
}

struct FeedState {
    store: Arc<Mutex<ConversationStore>>,
    receiver: broadcast::Receiver<String>,
    conversation_id: String,
    primed: bool,
}

impl FeedState {
    async fn read(&self) -> Vec<MessageRecord> {
        let mut store = self.store.lock().await;
        store.promote(&self.conversation_id);
        store.snapshot(&self.conversation_id)
    }
}

/// Build the snapshot stream for one conversation.
///
/// `receiver` must be subscribed before this is called so that no change between
/// subscription and the first poll is lost.
pub(super) fn message_feed(
    store: Arc<Mutex<ConversationStore>>,
    receiver: broadcast::Receiver<String>,
    conversation_id: String,
) -> MessageFeed {
    let state = FeedState {
        store,
        receiver,
        conversation_id,
        primed: false,
    };

    let stream = futures_util::stream::unfold(state, |mut state| async move {
        if !state.primed {
            state.primed = true;
            let snapshot = state.read().await;
            return Some((snapshot, state));
        }

        loop {
            match state.receiver.recv().await {
                Ok(changed) if changed == state.conversation_id => {
                    let snapshot = state.read().await;
                    return Some((snapshot, state));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        "Feed for {} lagged by {} change(s), resyncing",
                        state.conversation_id,
                        skipped
                    );
                    let snapshot = state.read().await;
                    return Some((snapshot, state));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Box::pin(stream)
}
