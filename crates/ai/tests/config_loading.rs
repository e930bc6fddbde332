use std::fs;

use ai::perception::LosAlgorithm;
use ai::AiConfig;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AiConfig::load_from_project(dir.path()).unwrap();
    assert_eq!(config, AiConfig::default());
    assert_eq!(config.lease.default_ttl_ms, 60_000);
}

#[test]
fn loads_project_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".ai")).unwrap();
    fs::write(
        dir.path().join(".ai/config.yaml"),
        r#"
version: "1"
lease:
  resource: steering
  default_ttl_ms: 0
perception:
  persistence_window_ms: 2500
  field_of_view_degrees: 90
  los_algorithm: !sampled
    step: 0.5
  diagnostics:
    per_kind_interval_ms: 100
"#,
    )
    .unwrap();

    let config = AiConfig::load_from_project(dir.path()).unwrap();

    assert_eq!(config.version.as_deref(), Some("1"));
    assert_eq!(config.lease.resource, "steering");
    assert_eq!(config.lease.default_ttl_ms, 0);
    assert_eq!(config.perception.persistence_window_ms, 2_500);
    assert_eq!(config.perception.field_of_view_degrees, 90.0);
    assert_eq!(
        config.perception.los_algorithm,
        LosAlgorithm::Sampled { step: 0.5 }
    );
    assert_eq!(config.perception.diagnostics.per_kind_interval_ms, 100);
    assert_eq!(config.perception.diagnostics.per_entity_interval_ms, 5_000);
}

#[test]
fn malformed_yaml_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "lease: [not, a, map]\n").unwrap();

    let err = AiConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.yaml"));
}
