use tokio::sync::broadcast;

use crate::models::Event;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// In-process event bus the UI layer subscribes to. Publishing is fire and
/// forget; with no subscriber attached the event is simply dropped.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Event>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: Event) {
        tracing::debug!(?event, "publishing event");
        let _ = self.tx.send(event);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
