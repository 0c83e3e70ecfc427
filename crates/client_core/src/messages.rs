//! Single-slot transient feedback with a cancellable auto-clear timer.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::Instant,
};
use tracing::debug;

use crate::ClientEvent;

pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub expires_at: Instant,
}

impl Message {
    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

#[derive(Default)]
struct MessageSlot {
    current: Option<Message>,
    // Bumped on every show/clear; a timer only clears the generation it was armed for.
    generation: u64,
    pending_clear: Option<JoinHandle<()>>,
}

impl MessageSlot {
    fn cancel_pending_clear(&mut self) {
        if let Some(handle) = self.pending_clear.take() {
            handle.abort();
        }
    }
}

#[derive(Clone)]
pub struct MessageCenter {
    slot: Arc<Mutex<MessageSlot>>,
    ttl: Duration,
    events: broadcast::Sender<ClientEvent>,
}

impl MessageCenter {
    pub fn new(ttl: Duration, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(MessageSlot::default())),
            ttl,
            events,
        }
    }

    /// Replaces whatever is visible and arms a fresh auto-clear for it.
    pub async fn show(&self, kind: MessageKind, text: impl Into<String>) {
        let message = Message {
            kind,
            text: text.into(),
            expires_at: Instant::now() + self.ttl,
        };

        let mut slot = self.slot.lock().await;
        slot.cancel_pending_clear();
        slot.generation += 1;
        let generation = slot.generation;
        let deadline = message.expires_at;
        slot.current = Some(message.clone());

        let center = self.clone();
        slot.pending_clear = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            center.expire(generation).await;
        }));
        let _ = self.events.send(ClientEvent::MessageChanged(Some(message)));
    }

    pub async fn success(&self, text: impl Into<String>) {
        self.show(MessageKind::Success, text).await;
    }

    pub async fn error(&self, text: impl Into<String>) {
        self.show(MessageKind::Error, text).await;
    }

    pub async fn clear(&self) {
        let mut slot = self.slot.lock().await;
        slot.cancel_pending_clear();
        slot.generation += 1;
        if slot.current.take().is_some() {
            let _ = self.events.send(ClientEvent::MessageChanged(None));
        }
    }

    pub async fn current(&self) -> Option<Message> {
        self.slot.lock().await.current.clone()
    }

    async fn expire(&self, generation: u64) {
        let mut slot = self.slot.lock().await;
        if slot.generation != generation {
            debug!(
                armed = generation,
                current = slot.generation,
                "messages: superseded auto-clear ignored"
            );
            return;
        }
        slot.pending_clear = None;
        if slot.current.take().is_some() {
            let _ = self.events.send(ClientEvent::MessageChanged(None));
        }
    }
}
