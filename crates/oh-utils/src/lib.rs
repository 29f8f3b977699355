//! Scripting helpers for openHAB items
//!
//! The central helper is [`get_item_state`], which reads an item's state from
//! the [`ItemRegistry`](oh_item_registry::ItemRegistry) and optionally
//! converts or coerces it:
//!
//! ```no_run
//! # use oh_utils::{get_item_state, ResolveOptions, ReturnType};
//! # use oh_core::Unit;
//! # fn demo(registry: &oh_item_registry::ItemRegistry) -> Result<(), oh_utils::ResolveError> {
//! let fahrenheit = get_item_state(
//!     registry,
//!     "Outside_Temperature",
//!     ResolveOptions::new().unit(Unit::Fahrenheit),
//! )?;
//! let whole = get_item_state(
//!     registry,
//!     "Outside_Temperature",
//!     ResolveOptions::new().return_type(ReturnType::Integer).default_value(0),
//! )?;
//! # Ok(())
//! # }
//! ```

mod error;
mod resolver;

pub use error::{ResolveError, ResolveResult};
pub use resolver::{
    get_item_state, ItemLookup, ResolveOptions, Resolved, ReturnType, StateResolver,
};
