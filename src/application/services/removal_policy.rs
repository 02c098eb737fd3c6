use serde::{Deserialize, Serialize};

/// Why the platform took down the source app's notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RemovalReason {
    /// Swiped away by the user
    UserCancel,
    /// Tapped by the user
    Click,
    /// Dismissed together with its notification group
    GroupSummaryCanceled,
    /// Withdrawn by the source app itself
    AppCancel,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalDecision {
    /// The thread was read; drop its history
    Delete,
    /// Likely an upstream un-send; keep history and surface a notice
    RetainWithNotice,
    Retain,
}

/// Decide what a removal of the source notification means for our history.
///
/// An app-initiated cancel while the source app is in the foreground means the user
/// opened the thread there. The same cancel in the background is what an un-send or
/// a silent sync looks like.
pub fn decide(reason: RemovalReason, source_in_foreground: bool) -> RemovalDecision {
    match reason {
        RemovalReason::UserCancel | RemovalReason::Click | RemovalReason::GroupSummaryCanceled => {
            RemovalDecision::Delete
        }
        RemovalReason::AppCancel if source_in_foreground => RemovalDecision::Delete,
        RemovalReason::AppCancel => RemovalDecision::RetainWithNotice,
        RemovalReason::Other => RemovalDecision::Retain,
    }
}
