use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AppId, CommentId, MessageId, UserId};

/// A user comment on a gallery app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub app_id: AppId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A mailbox message. Deletion is soft: the row is kept for audit and
/// only hidden from listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub deleted: bool,
}

impl Message {
    /// Whether the message shows up in the receiver's inbox.
    pub fn is_listed(&self) -> bool {
        !self.deleted
    }
}
