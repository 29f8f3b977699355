//! Loading a configuration file and resolving the seeded items

use oh_config::RuntimeConfig;
use oh_core::Unit;
use oh_runtime::OpenHab;
use oh_utils::{ResolveOptions, Resolved, ReturnType};
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
runtime:
  time_zone: "+01:00"
  state_wait_timeout_ms: 1000

items: !include items.yaml
"#;

const ITEMS: &str = r#"
- name: DogeString
  type: String
  state: "5 Dogecoins"
- name: DogeDate
  type: DateTime
  state: "1991-12-21T12:21:19"
- name: DogeNumber
  type: Number
  state: "55.5"
- name: DogeDimmer
  type: Dimmer
  state: "55"
- name: DogeColor
  type: Color
  label: Doge color
  state: "55,55,55"
- name: DogeTemp
  type: Number:Temperature
  state: "55.0 °C"
"#;

async fn load() -> (TempDir, OpenHab) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("openhab.yaml"), CONFIG).unwrap();
    fs::write(dir.path().join("items.yaml"), ITEMS).unwrap();

    let config = RuntimeConfig::load(dir.path().join("openhab.yaml")).unwrap();
    let openhab = OpenHab::from_config(config).await.unwrap();
    (dir, openhab)
}

#[tokio::test]
async fn test_items_are_seeded_from_included_file() {
    let (_dir, openhab) = load().await;

    let names: Vec<String> = openhab
        .items
        .item_names()
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(
        names,
        vec![
            "DogeColor",
            "DogeDate",
            "DogeDimmer",
            "DogeNumber",
            "DogeString",
            "DogeTemp"
        ]
    );
    assert_eq!(
        openhab.items.get("DogeColor").unwrap().label.as_deref(),
        Some("Doge color")
    );
}

#[tokio::test]
async fn test_seeded_states_resolve_as_text() {
    let (_dir, openhab) = load().await;
    let text = || ResolveOptions::new().return_type(ReturnType::Text);

    let cases = [
        ("DogeString", "5 Dogecoins"),
        ("DogeNumber", "55.5"),
        ("DogeDimmer", "55"),
        ("DogeColor", "55,55,55"),
        ("DogeTemp", "55.0 °C"),
        ("DogeDate", "1991-12-21T12:21:19.000+0100"),
    ];
    for (name, expected) in cases {
        assert_eq!(
            openhab.get_item_state(name, text()).unwrap(),
            Some(Resolved::from(expected)),
            "{}",
            name
        );
    }
}

#[tokio::test]
async fn test_zone_less_date_uses_configured_offset() {
    let (_dir, openhab) = load().await;

    let resolved = openhab
        .get_item_state(
            "DogeDate",
            ResolveOptions::new().return_type(ReturnType::UtcDateTime),
        )
        .unwrap();
    assert_eq!(
        resolved.map(|r| r.to_string()),
        Some("1991-12-21 11:21:19 UTC".to_string())
    );
}

#[tokio::test]
async fn test_unit_conversion_of_seeded_quantity() {
    let (_dir, openhab) = load().await;

    let resolved = openhab
        .get_item_state(
            "DogeTemp",
            ResolveOptions::new()
                .unit(Unit::Fahrenheit)
                .return_type(ReturnType::Text),
        )
        .unwrap();
    assert_eq!(resolved, Some(Resolved::from("131.0 °F")));
}
