//! Tests for get_item_state against a live item registry
//!
//! Each test creates an item, posts a state, waits for the update to be
//! applied and resolves it, then removes the item again.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use oh_core::types::utc_offset;
use oh_core::{
    DateTimeType, HsbColor, ItemState, ItemType, Percent, Quantity, TypedValue, Unit, ValueKind,
};
use oh_event_bus::EventBus;
use oh_item_registry::ItemRegistry;
use oh_utils::{get_item_state, ResolveError, ResolveOptions, Resolved, ReturnType};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const SETTLE: Duration = Duration::from_millis(500);

fn registry() -> Arc<ItemRegistry> {
    ItemRegistry::start(Arc::new(EventBus::new()))
}

/// Create `name`, post `value`, resolve with `options`, remove the item
async fn resolve_posted(
    name: &str,
    item_type: ItemType,
    value: impl Into<TypedValue>,
    options: ResolveOptions,
) -> Result<Option<Resolved>, ResolveError> {
    let registry = registry();
    let handle = registry.create(name, item_type).unwrap();
    registry
        .post_update_and_wait(&handle, value, SETTLE)
        .await
        .unwrap();

    let result = get_item_state(&registry, name, options);
    registry.remove(&handle);
    result
}

fn dogecoins() -> TypedValue {
    TypedValue::from("5 Dogecoins")
}

fn date() -> DateTimeType {
    DateTimeType::parse_with_offset("1991-12-21T12:21:19", utc_offset()).unwrap()
}

fn number() -> TypedValue {
    TypedValue::Decimal(Decimal::from_str("55.5").unwrap())
}

fn percent() -> TypedValue {
    Percent::new(55).unwrap().into()
}

fn color() -> TypedValue {
    HsbColor::new(55, Percent::new(55).unwrap(), Percent::new(55).unwrap())
        .unwrap()
        .into()
}

#[tokio::test]
async fn test_returns_none_for_missing_item_without_default() {
    let registry = registry();
    let result = get_item_state(&registry, "DogeDoesNotExist", ResolveOptions::new()).unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_returns_default_for_missing_item() {
    let registry = registry();
    let result = get_item_state(
        &registry,
        "DogeDoesNotExist",
        ResolveOptions::new().default_value("5 Dogecoins"),
    )
    .unwrap();
    assert_eq!(result, Some(Resolved::from("5 Dogecoins")));
}

#[tokio::test]
async fn test_returns_default_for_item_without_state() {
    let registry = registry();
    registry.create("DogeNull", ItemType::Number).unwrap();

    let result = get_item_state(
        &registry,
        "DogeNull",
        ResolveOptions::new()
            .return_type(ReturnType::Integer)
            .default_value(-1),
    )
    .unwrap();
    assert_eq!(result, Some(Resolved::Integer(-1)));
}

#[tokio::test]
async fn test_returns_default_for_undef_item() {
    let registry = registry();
    let handle = registry.create("DogeUndef", ItemType::String).unwrap();
    registry
        .post_update_and_wait(&handle, dogecoins(), SETTLE)
        .await
        .unwrap();
    registry.post_undef(&handle).unwrap();
    registry
        .wait_for_state("DogeUndef", |s| *s == ItemState::Undef, SETTLE)
        .await
        .unwrap();

    let result = get_item_state(&registry, "DogeUndef", ResolveOptions::new()).unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_returns_posted_state_for_each_item_type() {
    let cases = [
        ("DogeString", ItemType::String, dogecoins(), ValueKind::String),
        ("DogeDate", ItemType::DateTime, date().into(), ValueKind::DateTime),
        ("DogeNumber", ItemType::Number, number(), ValueKind::Decimal),
        ("DogeDimmer", ItemType::Dimmer, percent(), ValueKind::Percent),
        ("DogeColor", ItemType::Color, color(), ValueKind::Hsb),
    ];

    for (name, item_type, value, kind) in cases {
        let resolved = resolve_posted(name, item_type, value.clone(), ResolveOptions::new())
            .await
            .unwrap()
            .and_then(Resolved::into_state)
            .unwrap();
        assert_eq!(resolved, value, "{} should return the posted state", name);
        assert_eq!(resolved.kind(), kind, "{} should keep its kind", name);
    }
}

#[tokio::test]
async fn test_returns_fahrenheit_for_number_item_with_unit() {
    let celsius: Quantity = "55.0 °C".parse().unwrap();
    let expected: Quantity = "131.0 °F".parse().unwrap();

    let result = resolve_posted(
        "DogeTemp",
        ItemType::Number,
        celsius,
        ResolveOptions::new().unit_symbol("°F").unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(result, Some(Resolved::State(expected.into())));
}

#[tokio::test]
async fn test_returns_string_for_number_item_with_text_return_type() {
    let result = resolve_posted(
        "DogeNumber",
        ItemType::Number,
        number(),
        ResolveOptions::new().return_type(ReturnType::Text),
    )
    .await
    .unwrap();
    assert_eq!(result, Some(Resolved::from("55.5")));
}

#[tokio::test]
async fn test_returns_truncated_int_for_number_item_with_integer_return_type() {
    let integer = ResolveOptions::new().return_type(ReturnType::Integer);

    let result = resolve_posted("DogeNumber", ItemType::Number, number(), integer.clone())
        .await
        .unwrap();
    assert_eq!(result, Some(Resolved::Integer(55)));

    let result = resolve_posted(
        "DogeNumber",
        ItemType::Number,
        Decimal::from_str("55.9").unwrap(),
        integer,
    )
    .await
    .unwrap();
    assert_eq!(result, Some(Resolved::Integer(55)));
}

#[tokio::test]
async fn test_returns_datetime_for_date_item_with_return_type() {
    let expected_utc: DateTime<Utc> = Utc.with_ymd_and_hms(1991, 12, 21, 12, 21, 19).unwrap();

    let zoned = resolve_posted(
        "DogeDate",
        ItemType::DateTime,
        date(),
        ResolveOptions::new().return_type(ReturnType::DateTime),
    )
    .await
    .unwrap();
    let expected_zoned: DateTime<FixedOffset> = expected_utc.with_timezone(&utc_offset());
    assert_eq!(zoned, Some(Resolved::DateTime(expected_zoned)));

    let utc = resolve_posted(
        "DogeDate",
        ItemType::DateTime,
        date(),
        ResolveOptions::new().return_type(ReturnType::UtcDateTime),
    )
    .await
    .unwrap();
    assert_eq!(utc, Some(Resolved::UtcDateTime(expected_utc)));
}

#[tokio::test]
async fn test_datetime_keeps_posted_zone() {
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    let posted = DateTimeType::parse_with_offset("1991-12-21T12:21:19", offset).unwrap();

    let result = resolve_posted(
        "DogeDate",
        ItemType::DateTime,
        posted.clone(),
        ResolveOptions::new().return_type(ReturnType::DateTime),
    )
    .await
    .unwrap();

    match result {
        Some(Resolved::DateTime(dt)) => {
            assert_eq!(dt, posted.zoned());
            assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);
        }
        other => panic!("expected a zoned date-time, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unit_on_string_item_is_an_error() {
    let err = resolve_posted(
        "DogeString",
        ItemType::String,
        dogecoins(),
        ResolveOptions::new()
            .unit(Unit::Fahrenheit)
            .default_value("unused"),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        ResolveError::TypeCoercionUnsupported {
            kind: ValueKind::String,
            ..
        }
    ));
}

#[tokio::test]
async fn test_unit_of_other_dimension_is_an_error() {
    let err = resolve_posted(
        "DogeTemp",
        ItemType::Number,
        "55.0 °C".parse::<Quantity>().unwrap(),
        ResolveOptions::new().unit(Unit::Kilogram),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ResolveError::UnitDimensionMismatch { .. }));
}

#[tokio::test]
async fn test_removed_item_falls_back_to_default() {
    let registry = registry();
    let handle = registry.create("DogeString", ItemType::String).unwrap();
    registry
        .post_update_and_wait(&handle, dogecoins(), SETTLE)
        .await
        .unwrap();
    registry.remove(&handle);

    let result = get_item_state(
        &registry,
        "DogeString",
        ResolveOptions::new().default_value("gone"),
    )
    .unwrap();
    assert_eq!(result, Some(Resolved::from("gone")));
}
