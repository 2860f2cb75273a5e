//! Orchestrates one send/receive cycle per session: optimistic
//! append of the user message, relay call with the full history,
//! reconciliation of the reply or failure back into the store.

use anyhow::{Error, Result};

use super::relay::RelayClient;
use crate::session::{Message, Role, SessionStore, StoreError};

/// Appended in place of a reply when the relay cannot be reached or
/// reports a failure.
pub const SEND_FAILURE_TEXT: &str = "Error de conexión con el servidor.";

pub enum SendOutcome {
    /// The relay produced a reply and it was appended.
    Delivered(Message),
    /// The relay call failed and the fixed failure message was
    /// appended instead.
    Failed(Message),
    /// Nothing was sent: the submission was empty, another send was
    /// in flight, or the originating session disappeared before the
    /// reply landed.
    Ignored,
}

pub struct ChatController {
    store: SessionStore,
    relay: RelayClient,
    sending: Option<String>,
}

impl ChatController {
    pub fn new(store: SessionStore, relay: RelayClient) -> Self {
        Self {
            store,
            relay,
            sending: None,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    /// True while a send for the given session has not resolved yet.
    pub fn is_sending(&self, session_id: &str) -> bool {
        self.sending.as_deref() == Some(session_id)
    }

    /// Run one full send/receive cycle against the originating
    /// session. The user message is appended and persisted before the
    /// relay call, and the reply (or the fixed failure text) is
    /// appended to the same session once the call resolves, no matter
    /// which session is active by then.
    pub async fn send(&mut self, session_id: &str, text: &str) -> Result<SendOutcome, Error> {
        if text.trim().is_empty() || self.sending.is_some() {
            return Ok(SendOutcome::Ignored);
        }

        let user_msg = Message::new(Role::User, text);
        self.store.append_message(session_id, user_msg).await?;
        self.sending = Some(session_id.to_string());

        let history = self
            .store
            .messages(session_id)
            .map(|messages| messages.to_vec())
            .unwrap_or_default();

        let (reply_msg, delivered) = match self.relay.send(&history).await {
            Ok(reply) => (Message::new(Role::Assistant, &reply), true),
            Err(err) => {
                tracing::warn!("Relay call failed: {}", err);
                (Message::new(Role::Assistant, SEND_FAILURE_TEXT), false)
            }
        };
        self.sending = None;

        match self.store.append_message(session_id, reply_msg.clone()).await {
            Ok(()) => Ok(if delivered {
                SendOutcome::Delivered(reply_msg)
            } else {
                SendOutcome::Failed(reply_msg)
            }),
            // The originating session was deleted while the call was
            // in flight. Its log is gone, so the reply has nowhere
            // durable to go.
            Err(StoreError::SessionNotFound(id)) => {
                tracing::warn!("Session {} deleted while a send was in flight", id);
                Ok(SendOutcome::Ignored)
            }
            Err(err) => Err(err.into()),
        }
    }
}
