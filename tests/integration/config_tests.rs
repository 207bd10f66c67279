use ccdupe::cli::Cli;
use ccdupe::config::{Config, ConfigError};
use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.io_threads, 4);
    assert_eq!(config.chunk_size, 4096);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("CCDUPE_MIN_SIZE", "2048");
    std::env::set_var("CCDUPE_SKIP_HIDDEN", "true");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("CCDUPE_").split("__"));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.min_size, Some(2048));
    assert!(config.skip_hidden);

    // Clean up
    std::env::remove_var("CCDUPE_MIN_SIZE");
    std::env::remove_var("CCDUPE_SKIP_HIDDEN");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
min_size = 8
max_size = 1048576
follow_symlinks = true
ignore_patterns = ["target/", "*.tmp"]
io_threads = 2
chunk_size = 65536
permanent = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.min_size, Some(8));
    assert_eq!(config.max_size, Some(1_048_576));
    assert!(config.follow_symlinks);
    assert!(!config.skip_hidden);
    assert_eq!(config.ignore_patterns, vec!["target/", "*.tmp"]);
    assert_eq!(config.io_threads, 2);
    assert_eq!(config.chunk_size, 65_536);
    assert!(config.permanent);
}

#[test]
fn test_config_invalid_toml_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size = [").unwrap();

    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_cli_flags_override_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size = 100\nio_threads = 8\n").unwrap();

    let cli = Cli::try_parse_from([
        "ccdupe",
        temp_dir.path().to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
        "--minsize",
        "1KiB",
    ])
    .unwrap();

    let mut config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    cli.apply_to(&mut config);

    assert_eq!(config.min_size, Some(1024));
    assert_eq!(config.io_threads, 8);
}
