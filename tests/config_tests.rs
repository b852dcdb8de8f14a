use std::{collections::HashMap, io::Write};

use sql_safety_gateway::{
    config::{BackendType, DEFAULT_ROW_CAP, GatewayConfig, split_list},
    error::GatewayError,
    grammar::SqlDialect
};
use tempfile::NamedTempFile;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_default_config() {
    let config = GatewayConfig::default();
    assert_eq!(config.backend, "embedded");
    assert_eq!(config.row_cap, DEFAULT_ROW_CAP);
    assert_eq!(config.row_cap, 200);
    assert!(config.whitelist.is_empty());
    assert!(config.connection.is_none());
}

#[test]
fn test_from_toml() {
    let config = GatewayConfig::from_toml(
        r#"
backend = "networked"
connection = "postgres://reader@db/app"
whitelist = ["safe_users_v", "analytics.daily_orders"]
row_cap = 50
"#
    )
    .unwrap();
    assert_eq!(config.backend, "networked");
    assert_eq!(config.whitelist, vec!["safe_users_v", "analytics.daily_orders"]);
    assert_eq!(config.row_cap, 50);
}

#[test]
fn test_from_toml_partial_uses_defaults() {
    let config = GatewayConfig::from_toml("whitelist = [\"users\"]").unwrap();
    assert_eq!(config.backend, "embedded");
    assert_eq!(config.row_cap, DEFAULT_ROW_CAP);
}

#[test]
fn test_from_toml_invalid() {
    assert!(GatewayConfig::from_toml("row_cap = \"many\"").is_err());
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "backend = \"sqlite\"\nrow_cap = 10").unwrap();
    let config = GatewayConfig::from_file(file.path()).unwrap();
    assert_eq!(config.backend, "sqlite");
    assert_eq!(config.row_cap, 10);
}

#[test]
fn test_env_overrides_file_values() {
    let mut config = GatewayConfig::from_toml("whitelist = [\"a\"]\nrow_cap = 10").unwrap();
    config
        .apply_env(env_of(&[
            ("SQL_GATEWAY_BACKEND", "postgres"),
            ("SQL_GATEWAY_WHITELIST", "users, orders,,"),
            ("SQL_GATEWAY_ROW_CAP", " 75 ")
        ]))
        .unwrap();
    assert_eq!(config.backend, "postgres");
    assert_eq!(config.whitelist, vec!["users", "orders"]);
    assert_eq!(config.row_cap, 75);
}

#[test]
fn test_env_invalid_row_cap() {
    let mut config = GatewayConfig::default();
    let result = config.apply_env(env_of(&[("SQL_GATEWAY_ROW_CAP", "-3")]));
    assert!(result.is_err());
}

#[test]
fn test_backend_aliases() {
    assert_eq!("embedded".parse::<BackendType>().unwrap(), BackendType::Embedded);
    assert_eq!("SQLite".parse::<BackendType>().unwrap(), BackendType::Embedded);
    assert_eq!("networked".parse::<BackendType>().unwrap(), BackendType::Networked);
    assert_eq!("postgresql".parse::<BackendType>().unwrap(), BackendType::Networked);
}

#[test]
fn test_unsupported_backend() {
    let err = "oracle".parse::<BackendType>().unwrap_err();
    assert_eq!(
        err,
        GatewayError::UnsupportedBackend {
            value: "oracle".to_string()
        }
    );
    assert_eq!(err.kind(), "UnsupportedBackendError");

    let config = GatewayConfig {
        backend: "oracle".to_string(),
        ..Default::default()
    };
    assert!(config.settings().is_err());
}

#[test]
fn test_zero_row_cap_rejected() {
    let config = GatewayConfig {
        row_cap: 0,
        ..Default::default()
    };
    assert!(config.settings().is_err());
}

#[test]
fn test_backend_selects_dialect() {
    assert_eq!(BackendType::Embedded.dialect(), SqlDialect::SQLite);
    assert_eq!(BackendType::Networked.dialect(), SqlDialect::PostgreSQL);
}

#[test]
fn test_resource_hides_connection() {
    let config = GatewayConfig {
        backend: "networked".to_string(),
        connection: Some("postgres://reader:secret@db/app".to_string()),
        whitelist: vec!["Safe_Users_V".to_string(), "orders".to_string()],
        row_cap: 150
    };
    let resource = config.settings().unwrap().resource();
    let value = serde_json::to_value(&resource).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "backendType": "networked",
            "whitelist": ["safe_users_v", "orders"],
            "rowCap": 150
        })
    );
    assert!(!value.to_string().contains("secret"));
}

#[test]
fn test_split_list() {
    assert_eq!(split_list(" a ,b,, c "), vec!["a", "b", "c"]);
    assert!(split_list("").is_empty());
}

#[test]
fn test_connection_reaches_settings_but_not_debug_output() {
    let mut config = GatewayConfig::default();
    config
        .apply_env(env_of(&[("SQL_GATEWAY_CONNECTION", "/var/lib/app/secret.db")]))
        .unwrap();
    let settings = config.settings().unwrap();
    assert_eq!(settings.connection(), Some("/var/lib/app/secret.db"));
    assert!(!format!("{:?}", settings).contains("secret.db"));
    assert!(GatewayConfig::default().settings().unwrap().connection().is_none());
}
