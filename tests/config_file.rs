use std::fs;

use rust_decimal::Decimal;
use tempfile::TempDir;

use glidercheck::config::{ConfigError, ConfigKey, Configuration, HandicapConfig};

#[test]
fn missing_file_is_created_with_defaults() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("conf").join("glidercheck.toml");

    let config = Configuration::load(&path).expect("load");
    assert_eq!(config.values(), &HandicapConfig::default());
    assert!(path.exists());

    let text = fs::read_to_string(&path).expect("read");
    assert!(text.contains("gear_handicap = \"0.02\""));
    assert!(text.contains("allowed_difference = \"2\""));
}

#[test]
fn saved_values_survive_reload() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("glidercheck.toml");

    let mut config = Configuration::load(&path).expect("load");
    config.set(ConfigKey::OverweightStep, "5").expect("set");
    config.set(ConfigKey::GearHandicap, "0.025").expect("set");
    config.save().expect("save");

    let reloaded = Configuration::load(&path).expect("reload");
    assert_eq!(reloaded.values().overweight_step, 5);
    assert_eq!(reloaded.values().gear_handicap, Decimal::new(25, 3));
    assert_eq!(reloaded.get(ConfigKey::GearHandicap), "0.025");
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("glidercheck.toml");
    fs::write(&path, "gear_handicap = = 3\n[[").expect("write");

    let config = Configuration::load(&path).expect("load");
    assert_eq!(config.values(), &HandicapConfig::default());
}

#[test]
fn absent_and_unknown_keys_are_tolerated() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("glidercheck.toml");
    fs::write(&path, "underweight_step = \"20\"\nlegacy_option = \"x\"\n").expect("write");

    let config = Configuration::load(&path).expect("load");
    assert_eq!(config.values().underweight_step, 20);
    assert_eq!(config.values().overweight_step, 10);
}

#[test]
fn unquoted_numbers_are_read() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("glidercheck.toml");
    fs::write(
        &path,
        "gear_handicap = \"0.05\"\noverweight_step = 20\nunderweight_handicap = 0.004\n",
    )
    .expect("write");

    let config = Configuration::load(&path).expect("load");
    assert_eq!(config.values().gear_handicap, Decimal::new(5, 2));
    assert_eq!(config.values().overweight_step, 20);
    assert_eq!(config.values().underweight_handicap, Decimal::new(4, 3));
}

#[test]
fn one_bad_value_keeps_the_rest() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("glidercheck.toml");
    fs::write(&path, "overweight_step = 0\nallowed_difference = 4\nwinglets_handicap = true\n")
        .expect("write");

    let config = Configuration::load(&path).expect("load");
    assert_eq!(config.values().allowed_difference, 4);
    assert_eq!(config.values().overweight_step, 10);
    assert_eq!(
        config.values().winglets_handicap,
        HandicapConfig::default().winglets_handicap
    );
}

#[test]
fn invalid_values_are_rejected_without_change() {
    let mut config = Configuration::in_memory();
    assert!(matches!(
        config.set(ConfigKey::UnderweightStep, "0"),
        Err(ConfigError::Invalid { key: ConfigKey::UnderweightStep, .. })
    ));
    assert!(matches!(
        config.set(ConfigKey::WingletsHandicap, "a lot"),
        Err(ConfigError::Invalid { .. })
    ));
    assert!(matches!(
        config.set(ConfigKey::AllowedDifference, "-1"),
        Err(ConfigError::Invalid { .. })
    ));
    assert_eq!(config.values(), &HandicapConfig::default());
    assert!(matches!(
        "no_such_key".parse::<ConfigKey>(),
        Err(ConfigError::UnknownKey(name)) if name == "no_such_key"
    ));
}

#[test]
fn snapshot_restore_and_reset() {
    let mut config = Configuration::in_memory();
    let before = config.snapshot();
    config.set(ConfigKey::AllowedDifference, "4").expect("set");
    config.restore(before);
    assert_eq!(config.values().allowed_difference, 2);

    config.set(ConfigKey::OverweightHandicap, "0.01").expect("set");
    config.reset_to_defaults();
    assert_eq!(config.values(), &HandicapConfig::default());

    let names: Vec<&str> = config.entries().into_iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        ConfigKey::ALL.iter().map(|k| k.name()).collect::<Vec<_>>()
    );
    config.save().expect("in-memory save is a no-op");
}
