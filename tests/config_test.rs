// tests/config_test.rs
use chrono::Duration;
use drclean::config::{load_config, Config};
use drclean::domain::{RetentionPolicy, TagFormat};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_KEYS: [&str; 7] = [
    "REGISTRY_URL",
    "REGISTRY_USERNAME",
    "REGISTRY_PASSWORD",
    "TAG_SEPERATOR",
    "TAG_DATEFORMAT",
    "TAG_KEEPMIN",
    "TAG_MAXAGE",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.registry.url, "https://registry-1.docker.io/");
    assert_eq!(config.registry.username, "");
    assert_eq!(config.tag.seperator, "RC");
    assert_eq!(config.tag.dateformat, "%Y%m%d");
    assert_eq!(config.tag.keepmin, 10);
    assert_eq!(config.tag.maxage, std::time::Duration::from_secs(120 * 3600));
}

#[test]
#[serial]
fn test_load_from_file() {
    clear_env();
    let temp_file = write_config(
        r#"
[registry]
url = "https://registry.example.com"
username = "robot"
password = "s3cret"

[tag]
seperator = "-r"
dateformat = "20060102"
keepmin = 3
maxage = "7d"
"#,
    );

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.registry.url, "https://registry.example.com");
    assert_eq!(config.registry.username, "robot");
    assert_eq!(config.registry.password, "s3cret");
    assert_eq!(config.tag_format().unwrap(), TagFormat::new("-r", "%Y%m%d").unwrap());
    assert_eq!(
        config.retention_policy().unwrap(),
        RetentionPolicy::new(Duration::days(7), 3)
    );
}

#[test]
#[serial]
fn test_partial_file_keeps_defaults() {
    clear_env();
    let temp_file = write_config("[tag]\nkeepmin = 2\n");

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.tag.keepmin, 2);
    assert_eq!(config.tag.seperator, "RC");
    assert_eq!(config.registry.url, "https://registry-1.docker.io/");
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let temp_file = write_config("[tag]\nkeepmin = 2\nmaxage = \"1d\"\n");
    env::set_var("TAG_KEEPMIN", "4");
    env::set_var("TAG_MAXAGE", "48h");
    env::set_var("REGISTRY_URL", "http://localhost:5000");

    let config = load_config(Some(temp_file.path().to_str().unwrap()));
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.tag.keepmin, 4);
    assert_eq!(config.retention_policy().unwrap().max_age, Duration::days(2));
    assert_eq!(config.registry.url, "http://localhost:5000");
}

#[test]
#[serial]
fn test_malformed_keepmin_override_fails() {
    clear_env();
    let temp_file = write_config("");
    env::set_var("TAG_KEEPMIN", "lots");

    let result = load_config(Some(temp_file.path().to_str().unwrap()));
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_malformed_maxage_override_fails() {
    clear_env();
    let temp_file = write_config("");
    env::set_var("TAG_MAXAGE", "a while");

    let result = load_config(Some(temp_file.path().to_str().unwrap()));
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_invalid_toml_fails() {
    clear_env();
    let temp_file = write_config("[tag\nkeepmin = ");
    assert!(load_config(Some(temp_file.path().to_str().unwrap())).is_err());
}

#[test]
#[serial]
fn test_missing_explicit_file_fails() {
    clear_env();
    assert!(load_config(Some("/nonexistent/drclean.toml")).is_err());
}

#[test]
fn test_default_maxage_matches_default_policy() {
    assert_eq!(
        Config::default().retention_policy().unwrap().max_age,
        RetentionPolicy::default().max_age
    );
}
