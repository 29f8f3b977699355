//! Item state resolution
//!
//! [`StateResolver`] reads an item's current state and optionally converts
//! it to another unit and/or coerces it into a plain Rust value:
//!
//! 1. A missing item, or one whose state is `NULL`/`UNDEF`, resolves to the
//!    caller's default (or `None`).
//! 2. With a unit, the state must be a quantity and is converted.
//! 3. With a return type, the (converted) state is coerced.
//! 4. Otherwise the stored state is returned unchanged.

use chrono::{DateTime, FixedOffset, Utc};
use oh_core::{ItemName, ItemState, StandardUnitConverter, TypedValue, Unit, UnitConverter};
use oh_item_registry::ItemRegistry;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{ResolveError, ResolveResult};

/// Shape a resolved state is coerced into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnType {
    /// Canonical state text, e.g. `55.5` or `131.0 °F`
    Text,
    /// Numeric magnitude truncated toward zero
    Integer,
    /// Numeric magnitude as `f64`
    Float,
    /// Numeric magnitude as a `Decimal`, unit dropped
    Number,
    /// Date-time in the zone it was posted with
    DateTime,
    /// Date-time converted to UTC
    UtcDateTime,
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReturnType::Text => "text",
            ReturnType::Integer => "integer",
            ReturnType::Float => "float",
            ReturnType::Number => "number",
            ReturnType::DateTime => "date-time",
            ReturnType::UtcDateTime => "UTC date-time",
        };
        f.write_str(name)
    }
}

/// A resolved item state, or the default that stood in for it
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The typed state, possibly unit-converted
    State(TypedValue),
    Text(String),
    Integer(i64),
    Float(f64),
    Number(Decimal),
    DateTime(DateTime<FixedOffset>),
    UtcDateTime(DateTime<Utc>),
}

impl Resolved {
    pub fn as_state(&self) -> Option<&TypedValue> {
        match self {
            Resolved::State(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_state(self) -> Option<TypedValue> {
        match self {
            Resolved::State(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::State(value) => value.fmt(f),
            Resolved::Text(text) => f.write_str(text),
            Resolved::Integer(i) => i.fmt(f),
            Resolved::Float(x) => x.fmt(f),
            Resolved::Number(d) => d.fmt(f),
            Resolved::DateTime(dt) => dt.fmt(f),
            Resolved::UtcDateTime(dt) => dt.fmt(f),
        }
    }
}

impl From<TypedValue> for Resolved {
    fn from(value: TypedValue) -> Self {
        Resolved::State(value)
    }
}

impl From<&str> for Resolved {
    fn from(text: &str) -> Self {
        Resolved::Text(text.to_string())
    }
}

impl From<String> for Resolved {
    fn from(text: String) -> Self {
        Resolved::Text(text)
    }
}

impl From<i64> for Resolved {
    fn from(i: i64) -> Self {
        Resolved::Integer(i)
    }
}

impl From<f64> for Resolved {
    fn from(x: f64) -> Self {
        Resolved::Float(x)
    }
}

impl From<Decimal> for Resolved {
    fn from(d: Decimal) -> Self {
        Resolved::Number(d)
    }
}

impl From<DateTime<FixedOffset>> for Resolved {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Resolved::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for Resolved {
    fn from(dt: DateTime<Utc>) -> Self {
        Resolved::UtcDateTime(dt)
    }
}

/// Per-call options for [`StateResolver::resolve`]
///
/// - `return_type`: coerce the state into this shape
/// - `unit`: convert a quantity state into this unit first
/// - `default`: returned as-is when the item is missing or undefined
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOptions {
    pub return_type: Option<ReturnType>,
    pub unit: Option<Unit>,
    pub default: Option<Resolved>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn return_type(mut self, return_type: ReturnType) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Set the target unit from its symbol, e.g. `°F`
    pub fn unit_symbol(self, symbol: &str) -> ResolveResult<Self> {
        let unit = Unit::from_symbol(symbol.trim())
            .ok_or_else(|| ResolveError::UnknownUnit(symbol.to_string()))?;
        Ok(self.unit(unit))
    }

    pub fn default_value(mut self, default: impl Into<Resolved>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Read access to current item states
pub trait ItemLookup {
    /// Current state of the named item, `None` if there is no such item
    fn item_state(&self, name: &str) -> Option<ItemState>;
}

impl ItemLookup for ItemRegistry {
    fn item_state(&self, name: &str) -> Option<ItemState> {
        self.current_state(name)
    }
}

impl ItemLookup for HashMap<ItemName, ItemState> {
    fn item_state(&self, name: &str) -> Option<ItemState> {
        self.get(name).cloned()
    }
}

impl<L: ItemLookup + ?Sized> ItemLookup for Arc<L> {
    fn item_state(&self, name: &str) -> Option<ItemState> {
        (**self).item_state(name)
    }
}

impl<L: ItemLookup + ?Sized> ItemLookup for &L {
    fn item_state(&self, name: &str) -> Option<ItemState> {
        (**self).item_state(name)
    }
}

/// Resolves item states with optional unit conversion and coercion
///
/// Holds no mutable state; every call reads the latest state from the
/// lookup. Updates posted to an [`ItemRegistry`] are applied asynchronously,
/// so wait for them (`wait_for_state`) before resolving.
#[derive(Debug, Clone)]
pub struct StateResolver<L, C = StandardUnitConverter> {
    items: L,
    converter: C,
}

impl<L: ItemLookup> StateResolver<L> {
    pub fn new(items: L) -> Self {
        Self::with_converter(items, StandardUnitConverter)
    }
}

impl<L: ItemLookup, C: UnitConverter> StateResolver<L, C> {
    pub fn with_converter(items: L, converter: C) -> Self {
        Self { items, converter }
    }

    pub fn items(&self) -> &L {
        &self.items
    }

    /// Resolve the state of `name`
    ///
    /// Returns `Ok(None)` only when the item is missing or undefined and no
    /// default was given.
    pub fn resolve(&self, name: &str, options: ResolveOptions) -> ResolveResult<Option<Resolved>> {
        let ResolveOptions {
            return_type,
            unit,
            default,
        } = options;

        let Some(value) = self.items.item_state(name).and_then(ItemState::into_value) else {
            debug!(item = name, defaulted = default.is_some(), "No defined state");
            return Ok(default);
        };

        let value = match unit {
            Some(unit) => self.convert(name, value, unit)?,
            None => value,
        };

        let resolved = match return_type {
            Some(return_type) => coerce(name, value, return_type).map_err(|err| {
                debug!(item = name, error = %err, "Coercion failed");
                err
            })?,
            None => Resolved::State(value),
        };

        trace!(item = name, resolved = %resolved, "Resolved state");
        Ok(Some(resolved))
    }

    fn convert(&self, name: &str, value: TypedValue, unit: Unit) -> ResolveResult<TypedValue> {
        let Some(quantity) = value.as_quantity() else {
            debug!(item = name, kind = %value.kind(), %unit, "Unit requested for non-quantity");
            return Err(ResolveError::TypeCoercionUnsupported {
                item: name.to_string(),
                kind: value.kind(),
                target: format!("unit {}", unit),
            });
        };

        self.converter
            .convert(quantity, unit)
            .map(TypedValue::Quantity)
            .map_err(|err| {
                debug!(item = name, error = %err, "Unit conversion failed");
                ResolveError::from_unit_error(name, err)
            })
    }
}

fn coerce(name: &str, value: TypedValue, return_type: ReturnType) -> ResolveResult<Resolved> {
    let unsupported = |value: &TypedValue| ResolveError::TypeCoercionUnsupported {
        item: name.to_string(),
        kind: value.kind(),
        target: return_type.to_string(),
    };

    let resolved = match return_type {
        ReturnType::Text => Resolved::Text(value.to_string()),
        ReturnType::Integer => {
            let integer = value
                .as_decimal()
                .and_then(|d| d.trunc().to_i64())
                .ok_or_else(|| unsupported(&value))?;
            Resolved::Integer(integer)
        }
        ReturnType::Float => {
            let float = value
                .as_decimal()
                .and_then(|d| d.to_f64())
                .ok_or_else(|| unsupported(&value))?;
            Resolved::Float(float)
        }
        ReturnType::Number => {
            Resolved::Number(value.as_decimal().ok_or_else(|| unsupported(&value))?)
        }
        ReturnType::DateTime => {
            let dt = value.as_date_time().ok_or_else(|| unsupported(&value))?;
            Resolved::DateTime(dt.zoned())
        }
        ReturnType::UtcDateTime => {
            let dt = value.as_date_time().ok_or_else(|| unsupported(&value))?;
            Resolved::UtcDateTime(dt.to_utc())
        }
    };
    Ok(resolved)
}

/// Resolve the state of `name` from an item registry
///
/// Shorthand for `StateResolver::new(registry).resolve(name, options)`.
pub fn get_item_state(
    registry: &ItemRegistry,
    name: &str,
    options: ResolveOptions,
) -> ResolveResult<Option<Resolved>> {
    StateResolver::new(registry).resolve(name, options)
}
