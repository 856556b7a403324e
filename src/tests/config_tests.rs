use std::path::Path;

use crate::auth::AuthorizationGate;
use crate::config::{DisksizeConfig, DEFAULT_PRIVILEGE};
use crate::error::DisksizeError;
use crate::resolver::{PathResolver, SERVER_SCOPE};

#[test]
fn test_parse_toml() {
    let toml = r#"
[variables]
datadir = "/var/lib/mysql/"
log_bin_basename = "/var/lib/mysql/binlog"

[access]
user = "monitor"
grants = ["process", "sensitive_variables_observer"]
"#;
    let config = DisksizeConfig::from_toml_str(toml).unwrap();

    assert_eq!(config.variables["datadir"], "/var/lib/mysql/");
    assert_eq!(config.access.user, "monitor");
    assert_eq!(config.access.privilege, DEFAULT_PRIVILEGE);
    // Privilege names compare case-insensitively.
    assert!(config.gate().check(&config.session()));
    assert_eq!(
        config.resolver().get_variable(SERVER_SCOPE, "log_bin_basename").as_deref(),
        Some("/var/lib/mysql/binlog")
    );
}

#[test]
fn test_default_config_grants_access() {
    let config = DisksizeConfig::default();
    assert!(config.variables.is_empty());
    assert!(config.gate().check(&config.session()));
}

#[test]
fn test_access_without_grant_is_denied() {
    let config = DisksizeConfig::from_toml_str("[access]\ngrants = []\n").unwrap();
    assert!(!config.gate().check(&config.session()));
}

#[test]
fn test_env_overrides() {
    let mut config = DisksizeConfig::from_toml_str("[variables]\ndatadir = \"/from/file\"\n").unwrap();

    config.apply_env_overrides(|key| match key {
        "DISKSIZE_DATADIR" => Some("/from/env".to_string()),
        "DISKSIZE_REPLICA_LOAD_TMPDIR" => Some("/replica".to_string()),
        _ => None,
    });

    assert_eq!(config.variables["datadir"], "/from/env");
    assert_eq!(config.variables["replica_load_tmpdir"], "/replica");
    assert!(!config.variables.contains_key("tmpdir"));
}

#[test]
fn test_missing_file_uses_defaults() {
    let config = DisksizeConfig::load_file(Path::new("/nonexistent/disksize.toml")).unwrap();
    assert!(config.variables.is_empty());
}

#[test]
fn test_invalid_file_is_parse_error() {
    let path = std::env::temp_dir().join(format!("disksize-invalid-{}.toml", std::process::id()));
    std::fs::write(&path, "[variables\ndatadir = ").unwrap();

    let err = DisksizeConfig::load_file(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(err, DisksizeError::ConfigParse { .. }));
}
