use std::str::FromStr;

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and the JWT secret have defaults
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub database_url: String,
    /// Pool size (default: `20`).
    pub db_max_connections: u32,
    /// Interval of the expired-session sweep (default: `3600`).
    pub session_cleanup_interval_secs: u64,
    pub log_format: LogFormat,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `DATABASE_URL`                  | required                |
    /// | `DB_MAX_CONNECTIONS`            | `20`                    |
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                  |
    /// | `LOG_FORMAT`                    | `pretty`                |
    /// | `JWT_*`                         | see [`JwtConfig`]       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if let Err(e) = HeaderValue::from_str(origin) {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.clone(),
                    reason: e.to_string(),
                });
            }
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 3000)?,
            cors_origins,
            request_timeout_secs: positive_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30)?,
            database_url: required(&lookup, "DATABASE_URL")?,
            db_max_connections: positive_or(&lookup, "DB_MAX_CONNECTIONS", 20)?,
            session_cleanup_interval_secs: positive_or(
                &lookup,
                "SESSION_CLEANUP_INTERVAL_SECS",
                3600,
            )?,
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
            jwt: JwtConfig {
                secret: required(&lookup, "JWT_SECRET")?,
                access_token_expiry_mins: positive_or(&lookup, "JWT_ACCESS_EXPIRY_MINS", 15)?,
                refresh_token_expiry_days: positive_or(&lookup, "JWT_REFRESH_EXPIRY_DAYS", 7)?,
            },
        })
    }
}

/// Read a variable that must be present and non-empty.
fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

/// Parse a variable, falling back to `default` when it is unset.
fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        },
    }
}

/// Like [`parse_or`], but the value must be positive. Used for timeouts, intervals,
/// and sizes that cannot meaningfully be zero.
fn positive_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialOrd + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let parsed = parse_or(lookup, var, default)?;
    if parsed <= T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: parsed.to_string(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| map.get(name).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/qualityhub"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.db_max_connections, 20);
        assert_eq!(config.session_cleanup_interval_secs, 3600);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.jwt.access_token_expiry_mins, 15);
        assert_eq!(config.jwt.refresh_token_expiry_days, 7);
    }

    #[test]
    fn missing_secret_is_reported() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/qualityhub")]).unwrap_err();
        assert_matches!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn empty_secret_counts_as_missing() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/qualityhub"),
            ("JWT_SECRET", "  "),
        ])
        .unwrap_err();
        assert_matches!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn unparsable_port_names_the_variable() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("PORT", "http"));
        let err = load(&vars).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "PORT", .. });
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("CORS_ORIGINS", "http://a.test, http://b.test,,"));
        let config = load(&vars).unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn json_log_format_is_accepted() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("LOG_FORMAT", "JSON"));
        assert_eq!(load(&vars).unwrap().log_format, LogFormat::Json);

        let mut vars = MINIMAL.to_vec();
        vars.push(("LOG_FORMAT", "xml"));
        assert_matches!(load(&vars), Err(ConfigError::Invalid { var: "LOG_FORMAT", .. }));
    }

    #[test]
    fn zero_durations_and_sizes_are_rejected() {
        for var in [
            "REQUEST_TIMEOUT_SECS",
            "SESSION_CLEANUP_INTERVAL_SECS",
            "DB_MAX_CONNECTIONS",
            "JWT_ACCESS_EXPIRY_MINS",
            "JWT_REFRESH_EXPIRY_DAYS",
        ] {
            let mut vars = MINIMAL.to_vec();
            vars.push((var, "0"));
            assert_matches!(
                load(&vars),
                Err(ConfigError::Invalid { var: v, .. }) if v == var,
                "{var}=0 should be rejected"
            );
        }

        let mut vars = MINIMAL.to_vec();
        vars.push(("JWT_ACCESS_EXPIRY_MINS", "-5"));
        assert_matches!(
            load(&vars),
            Err(ConfigError::Invalid { var: "JWT_ACCESS_EXPIRY_MINS", .. })
        );
    }

    #[test]
    fn shutdown_timeout_may_be_zero() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("SHUTDOWN_TIMEOUT_SECS", "0"));
        assert_eq!(load(&vars).unwrap().shutdown_timeout_secs, 0);
    }
}
