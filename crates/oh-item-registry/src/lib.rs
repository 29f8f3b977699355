//! Item registry with asynchronous state updates
//!
//! This crate provides the ItemRegistry, which tracks every item and its
//! current state. Writes follow the openHAB event flow:
//!
//! 1. `post_update` validates the state against the item type and fires an
//!    `ItemStateEvent` on the bus, then returns.
//! 2. A background updater task consumes `ItemStateEvent`s, stores the new
//!    state and fires `ItemStateUpdatedEvent` (always) and
//!    `ItemStateChangedEvent` (when the value changed).
//!
//! Reads are therefore eventually consistent. Callers that must observe
//! their own update use [`ItemRegistry::wait_for_state`] or
//! [`ItemRegistry::post_update_and_wait`] rather than sleeping.

mod error;

pub use error::{RegistryError, RegistryResult};

use dashmap::DashMap;
use oh_core::events::{
    ItemAddedData, ItemRemovedData, ItemStateChangedData, ItemStateData, ItemStateUpdatedData,
};
use oh_core::{Context, Item, ItemName, ItemState, ItemType, TypedValue};
use oh_event_bus::{EventBus, RecvError};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

/// Reference to a registered item, returned by [`ItemRegistry::create`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemHandle {
    name: ItemName,
    item_type: ItemType,
}

impl ItemHandle {
    pub fn name(&self) -> &ItemName {
        &self.name
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }
}

/// The registry of all items
///
/// The ItemRegistry is responsible for:
/// - Storing every item with its declared type and current state
/// - Validating posted states against the item type
/// - Applying updates from the event bus and announcing the results
pub struct ItemRegistry {
    /// All items keyed by name
    items: DashMap<ItemName, Item>,
    /// Event bus carrying update requests and notifications
    event_bus: Arc<EventBus>,
    /// Background task applying `ItemStateEvent`s
    updater: Mutex<Option<JoinHandle<()>>>,
}

impl ItemRegistry {
    /// Create a registry without an updater task
    ///
    /// Posted updates are only applied once [`ItemRegistry::start`] (or
    /// `spawn_updater`) has run; use `start` unless you drive updates yourself.
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            items: DashMap::new(),
            event_bus,
            updater: Mutex::new(None),
        }
    }

    /// Create a registry and spawn its updater task
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(event_bus: Arc<EventBus>) -> Arc<Self> {
        let registry = Arc::new(Self::new(event_bus));
        registry.spawn_updater();
        registry
    }

    /// Spawn the task that applies posted updates
    ///
    /// The subscription is taken before returning, so updates posted right
    /// after this call are not lost. Calling it twice replaces the task.
    pub fn spawn_updater(self: &Arc<Self>) {
        let mut rx = self.event_bus.subscribe_typed::<ItemStateData>();
        let registry: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let Some(registry) = registry.upgrade() else {
                            break;
                        };
                        registry.apply_update(&event.data.item_name, event.data.state, &event.context);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Item updater lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            trace!("Item updater stopped");
        });

        if let Some(previous) = self.lock_updater().replace(handle) {
            previous.abort();
        }
    }

    fn lock_updater(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.updater
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The event bus this registry publishes on
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Create an item in the `NULL` state
    ///
    /// Fires an ITEM_ADDED event.
    pub fn create(&self, name: &str, item_type: ItemType) -> RegistryResult<ItemHandle> {
        let name = ItemName::new(name)?;
        self.add(Item::new(name, item_type))
    }

    /// Register a fully built item
    ///
    /// Fires an ITEM_ADDED event.
    #[instrument(skip(self, item), fields(item = %item.name, item_type = %item.item_type))]
    pub fn add(&self, item: Item) -> RegistryResult<ItemHandle> {
        let handle = ItemHandle {
            name: item.name.clone(),
            item_type: item.item_type,
        };

        match self.items.entry(item.name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(RegistryError::AlreadyExists(item.name));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(item.clone());
            }
        }

        debug!("Item added");
        self.event_bus
            .fire_item(ItemAddedData { item }, Context::new());
        Ok(handle)
    }

    /// Remove an item
    ///
    /// Fires an ITEM_REMOVED event if the item existed.
    #[instrument(skip(self), fields(item = %handle.name))]
    pub fn remove(&self, handle: &ItemHandle) -> Option<Item> {
        let (_, item) = self.items.remove(&handle.name)?;
        debug!("Item removed");
        self.event_bus
            .fire_item(ItemRemovedData { item: item.clone() }, Context::new());
        Some(item)
    }

    /// Get a snapshot of an item
    pub fn get(&self, name: &str) -> Option<Item> {
        self.items.get(name).map(|item| item.clone())
    }

    /// Get a handle for an existing item
    pub fn handle(&self, name: &str) -> Option<ItemHandle> {
        self.items.get(name).map(|item| ItemHandle {
            name: item.name.clone(),
            item_type: item.item_type,
        })
    }

    /// Get the current state of an item, or None if it doesn't exist
    pub fn current_state(&self, name: &str) -> Option<ItemState> {
        self.items.get(name).map(|item| item.state.clone())
    }

    /// All item names, sorted
    pub fn item_names(&self) -> Vec<ItemName> {
        let mut names: Vec<ItemName> = self.items.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Total number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Post a state update
    ///
    /// The value is checked against the item type (and normalized, e.g. a
    /// decimal posted to a Dimmer becomes a percentage) before an
    /// ITEM_STATE event is fired. The update is applied asynchronously.
    pub fn post_update(
        &self,
        handle: &ItemHandle,
        value: impl Into<TypedValue>,
    ) -> RegistryResult<()> {
        let state = self.validate(handle, value.into())?;
        self.post_state(handle, state);
        Ok(())
    }

    /// Post the `UNDEF` state
    pub fn post_undef(&self, handle: &ItemHandle) -> RegistryResult<()> {
        if !self.items.contains_key(&handle.name) {
            return Err(RegistryError::NotFound(handle.name.to_string()));
        }
        self.post_state(handle, ItemState::Undef);
        Ok(())
    }

    /// Post a state update and wait until the updater has applied it
    ///
    /// Returns the state stored by this update, even when earlier updates of
    /// the same item are still pending. Fails with `Timeout` if the update
    /// is not applied in time, e.g. because the item was removed meanwhile.
    pub async fn post_update_and_wait(
        &self,
        handle: &ItemHandle,
        value: impl Into<TypedValue>,
        timeout: Duration,
    ) -> RegistryResult<ItemState> {
        let state = self.validate(handle, value.into())?;
        let mut rx = self
            .event_bus
            .subscribe_item::<ItemStateUpdatedData>(&handle.name);
        let posted = self.post_state(handle, state.clone());

        let applied = async {
            loop {
                match rx.recv().await {
                    Ok(event) if event.context.parent_id.as_deref() == Some(posted.id.as_str()) => {
                        return Ok(event.data.state);
                    }
                    Ok(_) => continue,
                    // Our event may have been among the skipped ones
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(item = %handle.name, skipped, "Waiter lagged behind the event bus");
                        if let Some(current) = self.current_state(handle.name.as_str()) {
                            if current == state {
                                return Ok(current);
                            }
                        }
                    }
                    Err(RecvError::Closed) => return Err(RegistryError::BusClosed),
                }
            }
        };
        tokio::time::timeout(timeout, applied)
            .await
            .map_err(|_| RegistryError::Timeout {
                item: handle.name.clone(),
                timeout,
            })?
    }

    /// Wait until an item's state satisfies `predicate`
    ///
    /// Checks the current state first, then re-checks after every applied
    /// update of the item. Fails with `NotFound` if the item does not exist
    /// (or is removed while waiting) and with `Timeout` after `timeout`.
    pub async fn wait_for_state<F>(
        &self,
        name: &str,
        predicate: F,
        timeout: Duration,
    ) -> RegistryResult<ItemState>
    where
        F: Fn(&ItemState) -> bool,
    {
        let item_name = ItemName::new(name)
            .map_err(|_| RegistryError::NotFound(name.to_string()))?;
        let mut rx = self
            .event_bus
            .subscribe_item::<ItemStateUpdatedData>(&item_name);

        let wait = async {
            loop {
                let state = self
                    .current_state(name)
                    .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
                if predicate(&state) {
                    return Ok(state);
                }
                match rx.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return Err(RegistryError::BusClosed),
                }
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| RegistryError::Timeout {
                item: item_name.clone(),
                timeout,
            })?
    }

    fn validate(&self, handle: &ItemHandle, value: TypedValue) -> RegistryResult<ItemState> {
        let item_type = self
            .items
            .get(&handle.name)
            .map(|item| item.item_type)
            .ok_or_else(|| RegistryError::NotFound(handle.name.to_string()))?;

        item_type
            .accept(value)
            .map(ItemState::Value)
            .map_err(|source| RegistryError::IncompatibleState {
                item: handle.name.clone(),
                source,
            })
    }

    /// Fire an ITEM_STATE event, returning the context it was posted under
    fn post_state(&self, handle: &ItemHandle, state: ItemState) -> Context {
        trace!(item = %handle.name, state = %state, "Posting item state");
        let context = Context::new();
        self.event_bus.fire_item(
            ItemStateData {
                item_name: handle.name.clone(),
                state,
            },
            context.clone(),
        );
        context
    }

    /// Store a state and announce it
    ///
    /// The state is checked against the item type again, since the item may
    /// have been re-created with another type after the update was posted.
    /// Fires ITEM_STATE_UPDATED, and ITEM_STATE_CHANGED if the value changed.
    #[instrument(skip(self, state, context), fields(item = %name))]
    fn apply_update(&self, name: &ItemName, state: ItemState, context: &Context) {
        let Some(mut entry) = self.items.get_mut(name) else {
            debug!("Dropping update for removed item");
            return;
        };

        let state = match state {
            ItemState::Value(value) => match entry.item_type.accept(value) {
                Ok(value) => ItemState::Value(value),
                Err(e) => {
                    debug!(item_type = %entry.item_type, error = %e, "Dropping incompatible update");
                    return;
                }
            },
            undefined => undefined,
        };

        let old_state = entry.state.clone();
        let updated = entry.with_state(state.clone());
        *entry = updated;
        drop(entry);

        let changed = old_state != state;
        debug!(state = %state, changed, "Applied item state");

        self.event_bus.fire_item(
            ItemStateUpdatedData {
                item_name: name.clone(),
                state: state.clone(),
            },
            context.child(),
        );
        if changed {
            self.event_bus.fire_item(
                ItemStateChangedData {
                    item_name: name.clone(),
                    old_state,
                    new_state: state,
                },
                context.child(),
            );
        }
    }
}

impl Drop for ItemRegistry {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_updater().take() {
            handle.abort();
        }
    }
}

/// Thread-safe wrapper for ItemRegistry
pub type SharedItemRegistry = Arc<ItemRegistry>;
