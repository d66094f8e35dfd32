//! Configuration files drive the harness runner end to end.

use std::path::PathBuf;

use quarry_harness::config::{ConfigError, DriverKind, PlannerConfig, WatchdogConfig};
use quarry_harness::runner::run_plan;
use quarry_harness::worlds::woodcutter;

fn write_config(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn cheapest_of_config_selects_cheaper_goal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "cheapest.json",
        r#"{ "goal_mode": { "kind": "cheapest_of" }, "driver": "stepped" }"#,
    );
    let config = PlannerConfig::load(&path).unwrap();
    assert_eq!(config.driver, DriverKind::Stepped);

    let report = run_plan(&woodcutter::fire_or_planks(), &config).unwrap();
    assert_eq!(report.status, "found_plan");
    assert_eq!(report.goal_index, Some(1));
    assert_eq!(report.actions, ["chop", "saw"]);
    assert_eq!(report.driver, "stepped");
}

#[test]
fn cost_ceiling_config_cancels() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "ceiling.json",
        r#"{ "watchdog": { "kind": "cost_ceiling", "limit": 3.0 } }"#,
    );
    let config = PlannerConfig::load(&path).unwrap();
    assert_eq!(config.watchdog, WatchdogConfig::CostCeiling { limit: 3.0 });
    let report = run_plan(&woodcutter::unit_fire_chain(), &config).unwrap();
    assert_eq!(report.status, "cancelled");
}

#[test]
fn time_slice_config_still_finds_the_plan() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "slice.json",
        r#"{ "watchdog": { "kind": "time_slice", "millis": 0 }, "driver": "yielding", "trace": true }"#,
    );
    let config = PlannerConfig::load(&path).unwrap();
    let sliced = run_plan(&woodcutter::unit_fire_chain(), &config).unwrap();
    let plain = run_plan(&woodcutter::unit_fire_chain(), &PlannerConfig::default()).unwrap();
    assert_eq!(sliced.without_driver(), plain.without_driver());
    assert_eq!(
        sliced.without_driver().digest().unwrap(),
        plain.without_driver().digest().unwrap()
    );
}

#[test]
fn malformed_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let truncated = write_config(&dir, "truncated.json", r#"{ "driver": "#);
    assert!(matches!(
        PlannerConfig::load(&truncated),
        Err(ConfigError::Parse(_))
    ));

    let unknown_driver = write_config(&dir, "driver.json", r#"{ "driver": "threaded" }"#);
    assert!(matches!(
        PlannerConfig::load(&unknown_driver),
        Err(ConfigError::Parse(_))
    ));

    let negative = write_config(
        &dir,
        "negative.json",
        r#"{ "watchdog": { "kind": "cost_ceiling", "limit": -0.5 } }"#,
    );
    let err = PlannerConfig::load(&negative).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("cost ceiling"));
}
