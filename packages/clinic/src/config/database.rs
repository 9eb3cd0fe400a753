use std::{fmt::Display, time::Duration};

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_host")]
    pub host: String,

    #[serde(default = "DatabaseConfig::default_port")]
    pub port: u16,

    pub name: String,
    pub username: String,
    pub password: String,

    #[serde(default = "DatabaseConfig::default_connection_timeout")]
    pub connection_timeout: u64,

    #[serde(default)]
    pub with_tls_verification: bool,
}

impl DatabaseConfig {
    pub fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    pub const fn default_port() -> u16 {
        5432
    }

    // 5 minutes
    pub const fn default_connection_timeout() -> u64 {
        1000 * 60 * 5
    }

    pub fn to_socket_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connection_config(&self) -> tokio_postgres::Config {
        let mut db_config = tokio_postgres::Config::new();

        db_config
            .host(&self.host)
            .port(self.port)
            .user(&self.username)
            .password(&self.password)
            .dbname(&self.name)
            .connect_timeout(self.connection_timeout());

        db_config
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout)
    }
}

///
/// Password is NEVER EVER displayed
///
impl Display for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}:{}/{}",
            self.username, self.host, self.port, self.name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::DatabaseConfig;

    fn database() -> DatabaseConfig {
        DatabaseConfig {
            host: DatabaseConfig::default_host(),
            port: DatabaseConfig::default_port(),
            name: "clinic".to_string(),
            username: "clinic".to_string(),
            password: "sup3rs3cret".to_string(),
            connection_timeout: DatabaseConfig::default_connection_timeout(),
            with_tls_verification: false,
        }
    }

    #[test]
    fn display_hides_password() {
        let display = database().to_string();
        assert_eq!(display, "clinic@127.0.0.1:5432/clinic");
        assert!(!display.contains("sup3rs3cret"));
    }

    #[test]
    fn connection_config_uses_database_name() {
        let config = database().connection_config();
        assert_eq!(config.get_dbname(), Some("clinic"));
        assert_eq!(config.get_user(), Some("clinic"));
        assert_eq!(config.get_ports(), &[5432]);
    }
}
