//! Integration tests for loading and printing the model configuration.

use std::io::Write;

use minimind_probe::config::{ConfigError, LmConfig};

#[test]
fn test_default_config_prints() {
    let text = format!("{}", LmConfig::default());
    assert!(!text.is_empty());
    assert!(text.contains("LmConfig"));
    assert!(text.contains("\"vocab_size\": 6400"));
    assert!(text.contains("\"scoring_func\": \"softmax\""));
}

#[test]
fn test_printed_json_parses_back() {
    let cfg = LmConfig::default();
    let text = cfg.to_string();
    let json = text.strip_prefix("LmConfig ").unwrap();
    let parsed: LmConfig = serde_json::from_str(json).unwrap();
    assert_eq!(parsed, cfg);
}

#[test]
fn test_load_partial_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"dim": 768, "n_layers": 16, "use_moe": true}}"#).unwrap();

    let cfg = LmConfig::load(file.path()).unwrap();
    assert_eq!(cfg.dim, 768);
    assert_eq!(cfg.n_layers, 16);
    assert!(cfg.use_moe);
    // Untouched fields keep their defaults.
    assert_eq!(cfg.n_heads, 8);
    assert_eq!(cfg.vocab_size, 6400);
    assert_eq!(cfg.head_dim(), 96);
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = LmConfig::load(&dir.path().join("absent.json")).unwrap();
    assert_eq!(cfg, LmConfig::default());
}

#[test]
fn test_load_rejects_malformed_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let err = LmConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_load_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"n_heads": 0}}"#).unwrap();

    let err = LmConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_load_rejects_dim_that_overflows_ffn_size() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"dim": 4611686018427387904}}"#).unwrap();

    let err = LmConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("FFN hidden size"));
}

#[test]
fn test_load_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LmConfig::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
