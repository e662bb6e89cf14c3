use sf_domain::config::{AppConfig, FlagsConfig, LoggingConfig, ServerConfig};
use sf_domain::features::EnvironmentSet;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8080);
    assert!(server.ssl.is_none());
    assert_eq!(server.shutdown_grace_seconds, 30);

    let logging = LoggingConfig::default();
    assert!(logging.console);
    assert_eq!(logging.level, "info");
    assert!(logging.directory.is_none());

    let flags = FlagsConfig::default();
    assert_eq!(flags.environment, "development");
    assert_eq!(flags.features.len(), 3);
    assert!(flags.features.iter().all(|f| !f.enabled && f.rollout_percentage == 0));
}

#[test]
fn app_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 3000 },
        "logging": { "level": "debug", "json": true },
        "flags": {
            "environment": "staging",
            "metadata": { "version": "2.1.0", "last_updated": "2025-01-10" },
            "features": [
                {
                    "key": "teacherProfiles",
                    "name": "Teacher Profiles",
                    "enabled": true,
                    "rollout_percentage": 25,
                    "allowed_roles": ["admin", "teacher"],
                    "environments": ["staging", "production"]
                }
            ]
        }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.json);
    assert_eq!(cfg.flags.environment, "staging");
    assert_eq!(cfg.flags.metadata.version, "2.1.0");

    let feature = &cfg.flags.features[0];
    assert_eq!(feature.key.as_str(), "teacherProfiles");
    assert_eq!(feature.display_name, "Teacher Profiles");
    assert_eq!(feature.rollout_percentage, 25);
    assert_eq!(feature.environments, EnvironmentSet::STAGING | EnvironmentSet::PRODUCTION);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: AppConfig = serde_json::from_value(json!({})).expect("empty config");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.flags.features.len(), 3);
}

#[test]
fn config_clone_is_copy_on_write() {
    let original = AppConfig::default();
    let mut changed = original.clone();
    changed.server.port = 9999;

    assert_eq!(original.server.port, 8080);
    assert_eq!(changed.server.port, 9999);
}
