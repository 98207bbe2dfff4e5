//! Snapshot channel between the engine task and its observers.
//!
//! The engine is the only producer. Publishing never blocks: when the buffer is
//! full the message is dropped and a warning is traced. Observers drain whatever
//! has accumulated on their own schedule.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use crate::trader::{LogData, PositionData};

/// Log event type
pub const EVENT_LOG: &str = "eLog";

/// Price and account update event type
pub const EVENT_PRICE: &str = "ePrice";

/// Position list update event type
pub const EVENT_POSITIONS: &str = "ePositions";

/// Default channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Account-level figures published once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub price: f64,
    pub balance: f64,
    pub pnl: f64,
    pub trades_today: u32,
}

/// Message published by the engine. Every payload is an owned copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    Log(LogData),
    Price(PriceUpdate),
    Positions(Vec<PositionData>),
}

impl EngineEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::Log(_) => EVENT_LOG,
            EngineEvent::Price(_) => EVENT_PRICE,
            EngineEvent::Positions(_) => EVENT_POSITIONS,
        }
    }
}

/// Create a snapshot channel holding at most `capacity` undelivered messages.
pub fn snapshot_channel(capacity: usize) -> (SnapshotSender, SnapshotReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(2));
    (SnapshotSender { tx }, SnapshotReceiver { rx })
}

/// Producer half, owned by the engine task.
#[derive(Debug, Clone)]
pub struct SnapshotSender {
    tx: mpsc::Sender<EngineEvent>,
}

impl SnapshotSender {
    /// Push one event, dropping it if the buffer is full. Returns whether it was enqueued.
    pub fn publish(&self, event: EngineEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!("snapshot channel full, dropped {}", event.event_type());
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Push a price update and the matching position list as a pair.
    ///
    /// Both are enqueued or neither is, so observers never see one without the other.
    pub fn publish_snapshot(&self, price: PriceUpdate, positions: Vec<PositionData>) -> bool {
        if self.is_closed() {
            return false;
        }
        if self.tx.capacity() < 2 {
            tracing::warn!("snapshot channel full, dropped snapshot at {:.2}", price.price);
            return false;
        }
        self.publish(EngineEvent::Price(price)) && self.publish(EngineEvent::Positions(positions))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct SnapshotReceiver {
    rx: mpsc::Receiver<EngineEvent>,
}

impl SnapshotReceiver {
    /// Take every message buffered right now, in publish order. Never waits.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Wait for the next message. `None` once the engine is gone and the buffer is empty.
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.rx.recv().await
    }

    /// True once the engine is gone and nothing is left to drain.
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed() && self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trader::{Direction, LogLevel};

    fn price_update(price: f64) -> PriceUpdate {
        PriceUpdate {
            price,
            balance: 0.0,
            pnl: 0.0,
            trades_today: 0,
        }
    }

    #[test]
    fn test_drain_preserves_order() {
        let (tx, mut rx) = snapshot_channel(16);
        assert!(rx.drain().is_empty());

        tx.publish(EngineEvent::Log(LogData::new(LogLevel::Info, "first")));
        let position = PositionData::new(1, Direction::Long, 50000.0, 50000.0, 1.0, 2.0);
        assert!(tx.publish_snapshot(price_update(50000.0), vec![position]));

        let events = rx.drain();
        let types: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec![EVENT_LOG, EVENT_PRICE, EVENT_POSITIONS]);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn test_publish_drops_when_full() {
        let (tx, mut rx) = snapshot_channel(2);
        assert!(tx.publish(EngineEvent::Price(price_update(1.0))));
        assert!(tx.publish(EngineEvent::Price(price_update(2.0))));
        assert!(!tx.publish(EngineEvent::Price(price_update(3.0))));

        let events = rx.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], EngineEvent::Price(price_update(2.0)));
    }

    #[test]
    fn test_snapshot_pair_is_atomic() {
        let (tx, mut rx) = snapshot_channel(3);
        assert!(tx.publish_snapshot(price_update(1.0), Vec::new()));
        // one slot left: the pair must not be split
        assert!(!tx.publish_snapshot(price_update(2.0), Vec::new()));

        let events = rx.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], EngineEvent::Price(_)));
        assert!(matches!(events[1], EngineEvent::Positions(_)));
    }

    #[test]
    fn test_receiver_closed_after_drain() {
        let (tx, mut rx) = snapshot_channel(4);
        tx.publish(EngineEvent::Price(price_update(1.0)));
        drop(tx);
        assert!(!rx.is_closed());
        assert_eq!(rx.drain().len(), 1);
        assert!(rx.is_closed());
    }

    #[test]
    fn test_publish_after_receiver_dropped() {
        let (tx, rx) = snapshot_channel(4);
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.publish_snapshot(price_update(1.0), Vec::new()));
    }
}
