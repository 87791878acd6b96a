mod common;

use props_core::PropsError;
use props_registry::{Properties, PropertiesConfig};

use common::simulation;

#[test]
fn empty_document_yields_defaults() {
    let config = PropertiesConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, PropertiesConfig::default());
    assert_eq!(config.fd_delta, -1e-5);
    assert_eq!(config.fd_error, 1e-9);
    assert_eq!(config.min_fd, 1e-12);

    let params = config.finite_difference();
    assert!(params.is_adaptive());
    assert_eq!(params.max_halvings(), 24);
}

#[test]
fn partial_document_keeps_remaining_defaults() {
    let config = PropertiesConfig::from_yaml_str("fd_delta: 1.0e-4\n").unwrap();
    assert_eq!(config.fd_delta, 1e-4);
    assert_eq!(config.fd_error, 1e-9);
    assert!(!config.finite_difference().is_adaptive());
}

#[test]
fn yaml_round_trip() {
    let config = PropertiesConfig {
        fd_delta: -2.5e-4,
        fd_error: 1e-8,
        min_fd: 1e-10,
    };
    let yaml = config.to_yaml_string().unwrap();
    assert!(yaml.contains("fd_delta"));
    assert_eq!(PropertiesConfig::from_yaml_str(&yaml).unwrap(), config);
}

#[test]
fn unusable_values_are_rejected() {
    let cases = [
        ("fd_delta: 0.0", "invalid-delta"),
        ("fd_delta: -1.5", "invalid-delta"),
        ("fd_error: -1.0", "invalid-tolerance"),
        ("fd_error: 0.0", "invalid-tolerance"),
        ("min_fd: 0.0", "invalid-min-delta"),
        ("min_fd: 1.0e-3", "invalid-min-delta"),
    ];
    for (yaml, code) in cases {
        let err = PropertiesConfig::from_yaml_str(yaml).unwrap_err();
        assert!(
            matches!(&err, PropsError::Config(info) if info.code == code),
            "{yaml}: {err}"
        );
    }
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let err = PropertiesConfig::from_yaml_str("fd_delta: [1, 2]").unwrap_err();
    assert!(matches!(&err, PropsError::Config(info) if info.code == "yaml-deserialize"));
}

#[test]
fn bind_validates_the_configuration() {
    let sim = simulation();
    let config = PropertiesConfig {
        fd_delta: 2.0,
        ..PropertiesConfig::default()
    };
    let err = Properties::bind(&sim, &config).unwrap_err();
    assert_eq!(err.code(), "invalid-delta");
    assert!(err.info().hint.is_some());
}
