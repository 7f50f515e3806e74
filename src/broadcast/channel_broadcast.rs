use tokio::sync::broadcast;

use super::{Broadcast, OutboundEvent};

/// Fan-out sink backed by a tokio broadcast channel. Absent or lagging
/// receivers drop events rather than ever blocking the engine.
pub struct ChannelBroadcast {
    tx: broadcast::Sender<OutboundEvent>,
}

impl ChannelBroadcast {
    pub fn new(capacity: usize) -> ChannelBroadcast {
        let (tx, _) = broadcast::channel(capacity);
        ChannelBroadcast { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutboundEvent> {
        self.tx.subscribe()
    }
}

impl Broadcast for ChannelBroadcast {
    fn send(&self, event: OutboundEvent) {
        // send only errors when nobody is subscribed
        let _ = self.tx.send(event);
    }
}
