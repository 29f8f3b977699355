//! openHAB item runtime
//!
//! Bundles the event bus, the item registry (with its updater task) and a
//! state resolver, configured from a [`RuntimeConfig`].

use chrono::FixedOffset;
use oh_config::{ConfigError, ItemConfig, RuntimeConfig, UnitSystem};
use oh_core::{ItemName, ItemTypeError, TypedValue};
use oh_event_bus::EventBus;
use oh_item_registry::{ItemRegistry, RegistryError};
use oh_utils::{ResolveError, ResolveOptions, Resolved, StateResolver};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised while setting up or querying the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A configured initial state does not parse for the item type
    #[error("invalid initial state for item '{item}': {source}")]
    InitialState {
        item: ItemName,
        #[source]
        source: ItemTypeError,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// The central openHAB instance
pub struct OpenHab {
    /// Event bus for pub/sub communication
    pub bus: Arc<EventBus>,
    /// Registry of all items and their states
    pub items: Arc<ItemRegistry>,
    config: RuntimeConfig,
    resolver: StateResolver<Arc<ItemRegistry>>,
    offset: FixedOffset,
    unit_system: UnitSystem,
}

impl OpenHab {
    /// Create an instance without any items
    ///
    /// Must be called from within a tokio runtime (the registry spawns its
    /// updater task).
    pub fn new(config: RuntimeConfig) -> RuntimeResult<Self> {
        config.validate()?;
        let offset = config.offset()?;
        let unit_system = config.unit_system()?;

        let bus = Arc::new(EventBus::with_capacity(config.event_bus_capacity));
        let items = ItemRegistry::start(bus.clone());
        let resolver = StateResolver::new(items.clone());

        Ok(Self {
            bus,
            items,
            config,
            resolver,
            offset,
            unit_system,
        })
    }

    /// Create an instance and seed the configured items
    pub async fn from_config(config: RuntimeConfig) -> RuntimeResult<Self> {
        let openhab = Self::new(config)?;
        let seeded = openhab.seed_items().await?;
        info!(items = seeded, "Items loaded");
        Ok(openhab)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Offset applied to zone-less date-times
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn unit_system(&self) -> &UnitSystem {
        &self.unit_system
    }

    pub fn resolver(&self) -> &StateResolver<Arc<ItemRegistry>> {
        &self.resolver
    }

    /// Create every configured item and wait for its initial state
    ///
    /// Returns the number of items created.
    pub async fn seed_items(&self) -> RuntimeResult<usize> {
        for item_config in &self.config.items {
            self.seed_item(item_config).await?;
        }
        Ok(self.config.items.len())
    }

    #[instrument(skip(self, item_config), fields(item = %item_config.name))]
    async fn seed_item(&self, item_config: &ItemConfig) -> RuntimeResult<()> {
        let item = item_config.to_item()?;
        let handle = self.items.add(item)?;

        let Some(text) = &item_config.state else {
            debug!("No initial state");
            return Ok(());
        };

        let value = handle
            .item_type()
            .parse_state(text, self.offset)
            .map_err(|source| RuntimeError::InitialState {
                item: handle.name().clone(),
                source,
            })?;
        let state = self
            .items
            .post_update_and_wait(&handle, value, self.config.state_wait_timeout())
            .await?;
        debug!(%state, "Initial state applied");
        Ok(())
    }

    /// Resolve an item state, see [`StateResolver::resolve`]
    pub fn get_item_state(
        &self,
        name: &str,
        options: ResolveOptions,
    ) -> RuntimeResult<Option<Resolved>> {
        Ok(self.resolver.resolve(name, options)?)
    }

    /// Resolve an item state, converting quantities to the unit system's unit
    pub fn display_state(&self, name: &str) -> RuntimeResult<Option<Resolved>> {
        let resolved = self.resolver.resolve(name, ResolveOptions::new())?;
        let Some(Resolved::State(TypedValue::Quantity(quantity))) = &resolved else {
            return Ok(resolved);
        };

        let unit = self.unit_system.unit_for(quantity.dimension());
        if unit == quantity.unit() {
            return Ok(resolved);
        }
        Ok(self
            .resolver
            .resolve(name, ResolveOptions::new().unit(unit))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oh_core::{ItemState, ItemType, OnOff, Quantity, Unit};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn item(name: &str, item_type: ItemType, state: Option<&str>) -> ItemConfig {
        ItemConfig {
            name: name.to_string(),
            item_type,
            label: None,
            state: state.map(str::to_string),
        }
    }

    fn config(items: Vec<ItemConfig>) -> RuntimeConfig {
        RuntimeConfig {
            items,
            ..RuntimeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_new_is_empty() {
        let openhab = OpenHab::new(RuntimeConfig::default()).unwrap();
        assert!(openhab.items.is_empty());
        assert_eq!(openhab.offset().local_minus_utc(), 0);
    }

    #[tokio::test]
    async fn test_rejects_zero_bus_capacity() {
        let result = OpenHab::new(RuntimeConfig {
            event_bus_capacity: 0,
            ..RuntimeConfig::default()
        });
        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[tokio::test]
    async fn test_seeds_configured_items() {
        let openhab = OpenHab::from_config(config(vec![
            item("DogeString", ItemType::String, Some("5 Dogecoins")),
            item("DogeSwitch", ItemType::Switch, Some("ON")),
            item("DogeEmpty", ItemType::Number, None),
        ]))
        .await
        .unwrap();

        assert_eq!(openhab.items.len(), 3);
        assert_eq!(
            openhab.items.current_state("DogeString"),
            Some(ItemState::Value("5 Dogecoins".into()))
        );
        assert_eq!(
            openhab.items.current_state("DogeSwitch"),
            Some(ItemState::Value(OnOff::On.into()))
        );
        assert_eq!(openhab.items.current_state("DogeEmpty"), Some(ItemState::Null));
    }

    #[tokio::test]
    async fn test_invalid_initial_state() {
        let result = OpenHab::from_config(config(vec![item(
            "DogeSwitch",
            ItemType::Switch,
            Some("maybe"),
        )]))
        .await;
        assert!(matches!(result, Err(RuntimeError::InitialState { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_configured_item() {
        let result = OpenHab::from_config(config(vec![
            item("DogeString", ItemType::String, None),
            item("DogeString", ItemType::String, None),
        ]))
        .await;
        assert!(matches!(
            result,
            Err(RuntimeError::Registry(RegistryError::AlreadyExists(_)))
        ));
    }

    #[tokio::test]
    async fn test_display_state_uses_unit_system() {
        let mut runtime_config = config(vec![
            item("DogeTemp", ItemType::Number, Some("55.0 °C")),
            item("DogeString", ItemType::String, Some("much wow")),
        ]);
        runtime_config.unit_system = oh_config::UnitSystemConfig::Named("imperial".to_string());
        let openhab = OpenHab::from_config(runtime_config).await.unwrap();

        let expected = Quantity::new(Decimal::from_str("131.0").unwrap(), Unit::Fahrenheit);
        assert_eq!(
            openhab.display_state("DogeTemp").unwrap(),
            Some(Resolved::State(expected.into()))
        );
        assert_eq!(
            openhab.display_state("DogeString").unwrap(),
            Some(Resolved::State("much wow".into()))
        );
        assert_eq!(openhab.display_state("DogeMissing").unwrap(), None);
    }
}
