//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and overlaid by `FINANCE__`-prefixed
//! environment variables, e.g. `FINANCE__AUTH__JWT_KEY`.
//!
//! See `settings.example.toml` for the available keys.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub jwt_key: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
    #[serde(default = "default_secure_cookie")]
    pub secure_cookie: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_token_ttl() -> i64 {
    60
}

fn default_secure_cookie() -> bool {
    true
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("FINANCE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn defaults_fill_optional_keys() {
        let settings = parse(
            r#"
            [server]
            port = 8443
            database = "memory"

            [auth]
            jwt_key = "0123456789abcdef0123456789abcdef"
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.server.bind, None);
        assert_eq!(settings.auth.token_ttl_minutes, 60);
        assert!(settings.auth.secure_cookie);
    }

    #[test]
    fn sqlite_database_takes_a_path() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8443
            database = { sqlite = "finance.db" }

            [auth]
            jwt_key = "0123456789abcdef0123456789abcdef"
            token_ttl_minutes = 15
            secure_cookie = false
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.server.database,
            Database::Sqlite("finance.db".to_string())
        );
        assert_eq!(settings.auth.token_ttl_minutes, 15);
        assert!(!settings.auth.secure_cookie);
    }

    #[test]
    fn missing_jwt_key_is_an_error() {
        let result = parse(
            r#"
            [server]
            port = 8443
            database = "memory"

            [auth]
            "#,
        );
        assert!(result.is_err());
    }
}
