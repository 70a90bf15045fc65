//! Unit tests for configuration structures and parsing.

#[cfg(test)]
mod config_tests {
    use std::path::PathBuf;

    use tempfile::tempdir;

    use crate::config::*;
    use crate::error::AppError;

    // ============= Defaults Tests =============

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.lock_file, None);
        assert_eq!(config.orders.exchange, 9);
        assert_eq!(config.orders.qty, 100);
    }

    #[test]
    fn test_lock_path_defaults_to_temp_dir() {
        let config = AppConfig::default();
        assert_eq!(
            config.lock_path(),
            std::env::temp_dir().join("trade_automation_app.lock")
        );
    }

    // ============= Parsing Tests =============

    #[test]
    fn test_full_config() {
        let yaml = r#"
server:
  bind_addr: "0.0.0.0:8080"
data_dir: "/var/lib/kabus"
lock_file: "/run/kabus.lock"
orders:
  exchange: 1
  qty: 200
  batch_name: "open auction"
  memo: "gap fill"
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/kabus"));
        assert_eq!(config.lock_path(), PathBuf::from("/run/kabus.lock"));
        assert_eq!(config.orders.exchange, 1);
        assert_eq!(config.orders.qty, 200);
        assert_eq!(config.orders.batch_name, "open auction");
        assert_eq!(config.orders.memo, "gap fill");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
orders:
  qty: 300
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.orders.qty, 300);
        assert_eq!(config.orders.exchange, 9);
        assert_eq!(config.orders.batch_name, "manual batch");
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_bom_and_empty_config() {
        assert_eq!(AppConfig::from_yaml("\u{feff}").unwrap(), AppConfig::default());
        let config = AppConfig::from_yaml("\u{feff}data_dir: \"d\"\n").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("d"));
    }

    #[test]
    fn test_zero_qty_rejected() {
        let err = AppConfig::from_yaml("orders:\n  qty: 0\n").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let err = AppConfig::from_yaml("server: [not, a, map]\n").unwrap_err();
        assert!(matches!(err, AppError::Yaml(_)));
    }

    // ============= File Loading Tests =============

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server:\n  bind_addr: \"127.0.0.1:9000\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
    }
}
