use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_environment_gives_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
    assert!(cfg.seed);
    assert_eq!(cfg.ai.max_attempts, 2);
    assert_eq!(cfg.ai.call_timeout, Duration::from_secs(30));
    assert_eq!(cfg.max_body_bytes, 25 * 1024 * 1024);
}

#[test]
fn overrides_are_parsed() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("PORT", "8080"),
        ("ECOCLEAR_SEED", "false"),
        ("AI_MAX_ATTEMPTS", "4"),
        ("AI_RETRY_BACKOFF_MS", "10"),
        ("RATE_LIMIT_GLOBAL", "99"),
        ("MAX_BODY_BYTES", "1048576"),
    ]))
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.max_body_bytes, 1_048_576);
    assert!(!cfg.seed);
    assert_eq!(cfg.ai.max_attempts, 4);
    assert_eq!(cfg.ai.retry_backoff, Duration::from_millis(10));
    assert_eq!(cfg.rate_limit.global_limit, 99);
}

#[test]
fn zero_attempts_clamps_to_one() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("AI_MAX_ATTEMPTS", "0")])).unwrap();
    assert_eq!(cfg.ai.max_attempts, 1);
}

#[test]
fn bad_number_is_config_parse_error() {
    let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigParse { ref key, .. } if key == "PORT"));
}

#[test]
fn bad_bool_is_config_parse_error() {
    let err = AppConfig::from_lookup(lookup_from(&[("ECOCLEAR_SEED", "maybe")])).unwrap_err();
    assert!(err.to_string().contains("ECOCLEAR_SEED"));
}

#[test]
fn blank_value_uses_default() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("PORT", "  ")])).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
}
