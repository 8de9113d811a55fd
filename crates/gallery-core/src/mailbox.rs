use std::sync::Arc;

use gallery_store::{Entity, MetadataStore};
use gallery_types::{Message, MessageId, UserId};
use tracing::debug;

use crate::error::{GalleryError, GalleryResult};

/// Direct messages, mostly moderator notices. Deleted messages are kept
/// for the audit trail but no longer listed.
pub struct Mailbox {
    store: Arc<dyn MetadataStore>,
}

impl Mailbox {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    pub fn send_system_message(
        &self,
        sender: &UserId,
        receiver: &UserId,
        body: &str,
    ) -> GalleryResult<MessageId> {
        let message = self.store.insert_message(sender, receiver, body)?;
        debug!(message_id = %message.id, receiver = %receiver, "message sent");
        Ok(message.id)
    }

    /// Messages for `receiver`, oldest first.
    pub fn list_for_receiver(&self, receiver: &UserId) -> GalleryResult<Vec<Message>> {
        Ok(self.store.messages_for(receiver)?)
    }

    pub fn get_message(&self, id: &MessageId) -> GalleryResult<Message> {
        self.store
            .get_message(id)?
            .ok_or_else(|| GalleryError::not_found(Entity::Message, id))
    }

    pub fn mark_read(&self, id: &MessageId) -> GalleryResult<()> {
        Ok(self.store.mark_message_read(id)?)
    }

    pub fn soft_delete(&self, id: &MessageId) -> GalleryResult<()> {
        self.store.soft_delete_message(id)?;
        debug!(message_id = %id, "message deleted");
        Ok(())
    }
}
