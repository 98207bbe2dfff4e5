//! Outbound event stream of the engine.

mod channel;

pub use channel::{
    snapshot_channel, EngineEvent, PriceUpdate, SnapshotReceiver, SnapshotSender,
    DEFAULT_CHANNEL_CAPACITY, EVENT_LOG, EVENT_POSITIONS, EVENT_PRICE,
};
