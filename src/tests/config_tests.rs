use crate::config::AppConfig;

#[test]
fn test_parse_ini() {
    let mut config = AppConfig::default();
    let ini = r#"
# datastore-picker
PORT="7100"
HEADROOM="4096"
TRIALS="16"
SEED="42"
SOMETHING_ELSE="ignored"
"#;
    config.parse_ini(ini);
    assert_eq!(config.port, 7100);
    assert_eq!(config.headroom, 4096);
    assert_eq!(config.trials, 16);
    assert_eq!(config.seed, Some(42));
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_ini_keeps_defaults_on_bad_values() {
    let mut config = AppConfig::default();
    config.parse_ini("TRIALS=\"many\"\nSEED=\"-3\"\nPORT=\"70000\"");

    let defaults = AppConfig::default();
    assert_eq!(config.trials, defaults.trials);
    assert_eq!(config.seed, None);
    assert_eq!(config.port, defaults.port);
}

#[test]
fn test_empty_seed_clears_it() {
    let mut config = AppConfig::default();
    config.parse_ini("SEED=\"5\"");
    assert_eq!(config.seed, Some(5));
    config.parse_ini("SEED=\"\"");
    assert_eq!(config.seed, None);
}

#[test]
fn test_default_config_validates() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.headroom, 1024);
}

#[test]
fn test_validation_rejects_negative_headroom_and_bad_trials() {
    let mut config = AppConfig::default();
    config.parse_ini("HEADROOM=\"-1\"");
    assert_eq!(config.headroom, -1);
    assert!(config.validate().is_err());

    let config = AppConfig { trials: 0, ..AppConfig::default() };
    assert!(config.validate().is_err());

    let config = AppConfig { trials: 100_000, ..AppConfig::default() };
    assert!(config.validate().is_err());
}

#[test]
fn test_picker_settings_follow_config() {
    let config = AppConfig { headroom: 0, trials: 3, seed: Some(9), ..AppConfig::default() };
    let settings = config.picker_settings();
    assert_eq!(settings.headroom, 0);
    assert_eq!(settings.trials, 3);
    assert_eq!(settings.seed, Some(9));
}
