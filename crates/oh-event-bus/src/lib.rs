//! Event bus with typed pub/sub for openHAB items
//!
//! This crate provides the EventBus, the message broker between the item
//! registry and everything that reacts to items. State updates are posted
//! to the bus as `ItemStateEvent`s and applied asynchronously, so readers
//! that need to observe an update subscribe here.

use dashmap::DashMap;
use oh_core::{Context, Event, EventData, EventType, ItemEventData, ItemName};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Default channel capacity for event subscriptions
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

pub use tokio::sync::broadcast::error::RecvError;

/// The event bus for publishing and subscribing to events
///
/// Supports:
/// - Subscribing to specific event types
/// - Subscribing to all events (MATCH_ALL)
/// - Typed subscriptions, optionally filtered to a single item
pub struct EventBus {
    /// Map of event types to their broadcast senders
    channels: DashMap<EventType, broadcast::Sender<Event<serde_json::Value>>>,
    /// Special sender for MATCH_ALL subscribers
    match_all_sender: broadcast::Sender<Event<serde_json::Value>>,
    /// Channel capacity
    capacity: usize,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event bus with specified channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (match_all_sender, _) = broadcast::channel(capacity);
        Self {
            channels: DashMap::new(),
            match_all_sender,
            capacity,
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe(
        &self,
        event_type: impl Into<EventType>,
    ) -> broadcast::Receiver<Event<serde_json::Value>> {
        let event_type = event_type.into();
        trace!(event_type = %event_type, "Subscribing to event type");

        if event_type.is_match_all() {
            return self.match_all_sender.subscribe();
        }

        self.channels
            .entry(event_type)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribe to a typed event
    pub fn subscribe_typed<T: EventData + serde::de::DeserializeOwned>(
        &self,
    ) -> TypedEventReceiver<T> {
        TypedEventReceiver::new(self.subscribe(T::event_type()), None)
    }

    /// Subscribe to a typed item event, only for the named item
    pub fn subscribe_item<T: ItemEventData + serde::de::DeserializeOwned>(
        &self,
        item_name: &ItemName,
    ) -> TypedEventReceiver<T> {
        TypedEventReceiver::new(self.subscribe(T::event_type()), Some(item_name.clone()))
    }

    /// Subscribe to all events
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event<serde_json::Value>> {
        self.match_all_sender.subscribe()
    }

    /// Fire an event to all subscribers of its type and all MATCH_ALL subscribers
    pub fn fire(&self, event: Event<serde_json::Value>) {
        debug!(event_type = %event.event_type, topic = ?event.topic, "Firing event");

        if let Some(sender) = self.channels.get(&event.event_type) {
            // Send errors only mean there are no active receivers
            let _ = sender.send(event.clone());
        }
        let _ = self.match_all_sender.send(event);
    }

    /// Fire a typed event
    pub fn fire_typed<T: EventData + serde::Serialize>(&self, data: T, context: Context) {
        self.fire_event(Event::typed(data, context));
    }

    /// Fire a typed item event, with its `openhab/items/...` topic set
    pub fn fire_item<T: ItemEventData + serde::Serialize>(&self, data: T, context: Context) {
        self.fire_event(Event::item(data, context));
    }

    /// Serialize the payload and fire; an unserializable payload is logged and dropped
    fn fire_event<T: serde::Serialize>(&self, event: Event<T>) {
        let data = match serde_json::to_value(&event.data) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    event_type = %event.event_type,
                    topic = ?event.topic,
                    error = %e,
                    "Dropping event with unserializable payload"
                );
                return;
            }
        };
        self.fire(event.map(|_| data));
    }

    /// Number of event types with a channel
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of live receivers for an event type
    pub fn receiver_count(&self, event_type: impl Into<EventType>) -> usize {
        let event_type = event_type.into();
        if event_type.is_match_all() {
            return self.match_all_sender.receiver_count();
        }
        self.channels
            .get(&event_type)
            .map(|sender| sender.receiver_count())
            .unwrap_or_default()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A receiver for typed events
///
/// Events whose payload does not deserialize into `T`, or that concern a
/// different item than the one filtered on, are skipped.
pub struct TypedEventReceiver<T> {
    rx: broadcast::Receiver<Event<serde_json::Value>>,
    item_name: Option<ItemName>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: EventData + serde::de::DeserializeOwned> TypedEventReceiver<T> {
    fn new(rx: broadcast::Receiver<Event<serde_json::Value>>, item_name: Option<ItemName>) -> Self {
        Self {
            rx,
            item_name,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Receive the next matching typed event
    ///
    /// Returns `RecvError::Lagged` if the receiver fell behind, and
    /// `RecvError::Closed` once the bus is dropped.
    pub async fn recv(&mut self) -> Result<Event<T>, RecvError> {
        loop {
            let event = self.rx.recv().await?;
            if let Some(item_name) = &self.item_name {
                let expected = item_name.as_str();
                if event.data.get("item_name").and_then(|v| v.as_str()) != Some(expected)
                    && event.data.pointer("/item/name").and_then(|v| v.as_str()) != Some(expected)
                {
                    continue;
                }
            }
            if let Ok(data) = serde_json::from_value::<T>(event.data.clone()) {
                return Ok(event.map(|_| data));
            }
        }
    }
}

/// Thread-safe wrapper for EventBus
pub type SharedEventBus = Arc<EventBus>;
