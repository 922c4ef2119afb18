use crate::app_config::{AppConfig, CountMode, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional_path = |var: &str| -> Option<PathBuf> {
        lookup(var)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let catalog_path = PathBuf::from(require("STONEMART_CATALOG_PATH")?);
    let categories_path = optional_path("STONEMART_CATEGORIES_PATH");
    let taxonomy_path = optional_path("STONEMART_TAXONOMY_PATH");

    let env = parse_environment(&or_default("STONEMART_ENV", "development"))?;

    let raw_bind = or_default("STONEMART_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = raw_bind
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "STONEMART_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("STONEMART_LOG_LEVEL", "info");

    let count_mode = parse_count_mode(&or_default("STONEMART_COUNT_MODE", "independent"))?;

    let rate_limit_per_minute = parse_usize("STONEMART_RATE_LIMIT_PER_MINUTE", "120")?;
    if rate_limit_per_minute == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STONEMART_RATE_LIMIT_PER_MINUTE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        categories_path,
        taxonomy_path,
        count_mode,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STONEMART_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_count_mode(s: &str) -> Result<CountMode, ConfigError> {
    s.parse().map_err(|reason| ConfigError::InvalidEnvVar {
        var: "STONEMART_COUNT_MODE".to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("STONEMART_CATALOG_PATH", "./data/listings.json");
        m
    }

    #[test]
    fn parse_environment_known_values() {
        assert_eq!(
            parse_environment("development").unwrap(),
            Environment::Development
        );
        assert_eq!(parse_environment("test").unwrap(), Environment::Test);
        assert_eq!(
            parse_environment("production").unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn parse_environment_unknown_fails() {
        let err = parse_environment("staging").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STONEMART_ENV"));
    }

    #[test]
    fn build_app_config_fails_without_catalog_path() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STONEMART_CATALOG_PATH"),
            "expected MissingEnvVar(STONEMART_CATALOG_PATH), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_defaults() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.catalog_path.to_str(), Some("./data/listings.json"));
        assert!(cfg.categories_path.is_none());
        assert!(cfg.taxonomy_path.is_none());
        assert_eq!(cfg.count_mode, CountMode::Independent);
        assert_eq!(cfg.rate_limit_per_minute, 120);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map = full_env();
        map.insert("STONEMART_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STONEMART_BIND_ADDR"),
            "expected InvalidEnvVar(STONEMART_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn optional_paths_ignore_blank_values() {
        let mut map = full_env();
        map.insert("STONEMART_CATEGORIES_PATH", "  ");
        map.insert("STONEMART_TAXONOMY_PATH", "./config/locations.yaml");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.categories_path.is_none());
        assert_eq!(
            cfg.taxonomy_path.as_deref().and_then(|p| p.to_str()),
            Some("./config/locations.yaml")
        );
    }

    #[test]
    fn count_mode_accepts_cross_filtered() {
        let mut map = full_env();
        map.insert("STONEMART_COUNT_MODE", "Cross-Filtered");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.count_mode, CountMode::CrossFiltered);
    }

    #[test]
    fn count_mode_rejects_unknown_value() {
        let mut map = full_env();
        map.insert("STONEMART_COUNT_MODE", "live");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STONEMART_COUNT_MODE"),
            "expected InvalidEnvVar(STONEMART_COUNT_MODE), got: {result:?}"
        );
    }

    #[test]
    fn rate_limit_must_be_positive() {
        let mut map = full_env();
        map.insert("STONEMART_RATE_LIMIT_PER_MINUTE", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STONEMART_RATE_LIMIT_PER_MINUTE"),
            "expected InvalidEnvVar(STONEMART_RATE_LIMIT_PER_MINUTE), got: {result:?}"
        );
    }
}
