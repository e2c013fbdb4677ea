//! Integration tests for packetsim-config

use packetsim_config::*;
use std::io::Write;
use std::time::Duration;
use temp_env::with_vars;

#[test]
fn test_default_config_validation() {
    let config = PacketsimConfig::default();
    assert!(config.validate_all().is_ok());
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.workload.default_min_processing_time_ms, 1000);
    assert!(config.gate.start_open);
    assert_eq!(config.gate.initial_reason, "Server started");
    assert_eq!(config.metrics.namespace, "app");
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("PACKETSIM_SERVER_PORT", Some("9090")),
        ("PACKETSIM_SERVER_BIND_ADDRESS", Some("127.0.0.1")),
        ("PACKETSIM_LOG_LEVEL", Some("debug")),
        ("PACKETSIM_LOG_FORMAT", Some("json")),
        ("PACKETSIM_GATE_START_OPEN", Some("false")),
        ("PACKETSIM_DEFAULT_CPU_INTENSITY", Some("2")),
        ("PACKETSIM_DEFAULT_RAM_INTENSITY", Some("3")),
        ("PACKETSIM_DEFAULT_MIN_PROCESSING_TIME_MS", Some("50")),
    ];

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.gate.start_open);
        assert_eq!(config.workload.default_cpu_intensity, 2);
        assert_eq!(config.workload.default_ram_intensity, 3);
        assert_eq!(config.workload.default_min_processing_time_ms, 50);
    });
}

#[test]
fn test_invalid_env_values_are_errors() {
    with_vars(vec![("PACKETSIM_SERVER_PORT", Some("eighty"))], || {
        match ConfigLoader::new().from_env().unwrap_err() {
            ConfigError::Env { var, value, .. } => {
                assert_eq!(var, "PACKETSIM_SERVER_PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other}"),
        }
    });

    with_vars(vec![("PACKETSIM_LOG_LEVEL", Some("loud"))], || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Env { .. }));
        assert!(err.to_string().contains("PACKETSIM_LOG_LEVEL"));
    });

    // Parses, but fails domain validation
    with_vars(vec![("PACKETSIM_DEFAULT_CPU_INTENSITY", Some("42"))], || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert_eq!(err.domain(), Some("workload"));
    });
}

#[test]
fn test_unparseable_file_names_the_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"server\": ").unwrap();

    with_vars(Vec::<(&str, Option<&str>)>::new(), || {
        let err = ConfigLoader::new().from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    });
}

#[test]
fn test_logging_modules_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("quiet.yaml");
    std::fs::write(
        &path,
        "logging:\n  level: info\n  modules:\n    packetsim_core: warn\n",
    )
    .unwrap();

    with_vars(Vec::<(&str, Option<&str>)>::new(), || {
        let config = ConfigLoader::new().from_file(&path).unwrap();
        assert_eq!(config.logging.filter_directive(), "info,packetsim_core=warn");
    });
}

#[test]
fn test_custom_prefix() {
    with_vars(vec![("WORKER_SERVER_PORT", Some("7070"))], || {
        let config = ConfigLoader::with_prefix("WORKER").from_env().unwrap();
        assert_eq!(config.server.port, 7070);
    });
}

#[test]
fn test_yaml_config_serialization() {
    let yaml = PacketsimConfig::generate_sample();
    let parsed: PacketsimConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed, PacketsimConfig::default());
    assert!(parsed.validate_all().is_ok());
}

#[test]
fn test_comprehensive_yaml_file() {
    let yaml = r#"
server:
  bind_address: "127.0.0.1"
  port: 9191
  api_prefix: "/api/v2"
  enable_cors: false
  shutdown_timeout: 5

workload:
  default_cpu_intensity: 1
  default_ram_intensity: 10
  default_min_processing_time_ms: 0

gate:
  start_open: false
  initial_reason: "Waiting for load balancer"

logging:
  level: warn
  format: compact

metrics:
  prometheus_enabled: false
"#;
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    with_vars(Vec::<(&str, Option<&str>)>::new(), || {
        let config = ConfigLoader::new().from_file(file.path()).unwrap();

        assert_eq!(config.server.socket_address(), "127.0.0.1:9191");
        assert_eq!(config.server.api_prefix, "/api/v2");
        assert!(!config.server.enable_cors);
        assert!(config.server.enable_request_id);
        assert_eq!(config.server.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.workload.default_ram_intensity, 10);
        assert_eq!(config.workload.default_min_processing_time_ms, 0);
        assert!(!config.gate.start_open);
        assert_eq!(config.gate.initial_reason, "Waiting for load balancer");
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(!config.metrics.prometheus_enabled);
        assert_eq!(config.metrics.namespace, "app");
    });
}

#[test]
fn test_json_file_and_env_override() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("packetsim.json");
    std::fs::write(&path, r#"{"server": {"port": 9000}, "gate": {"start_open": true}}"#).unwrap();

    with_vars(vec![("PACKETSIM_SERVER_PORT", Some("9001"))], || {
        let config = ConfigLoader::new().load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9001);
        assert!(config.gate.start_open);
    });
}

#[test]
fn test_missing_file_is_an_error() {
    let err = ConfigLoader::new()
        .from_file("/definitely/not/here/packetsim.yaml")
        .unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("/definitely/not/here/packetsim.yaml"));
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "server:\n  api_prefix: \"no-slash\"\n").unwrap();

    with_vars(Vec::<(&str, Option<&str>)>::new(), || {
        let err = ConfigLoader::new().from_file(&path).unwrap_err();
        match err {
            ConfigError::Invalid { domain, .. } => assert_eq!(domain, "server"),
            other => panic!("unexpected error: {other}"),
        }
    });
}
