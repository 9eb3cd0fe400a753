use super::{
    AuthConfig, DatabaseConfig, LogConfig, LogFormat, ServerConfig, CLINIC_PREFIX,
};
use crate::error::{ConfigError, Error};
use crate::Args;
use config::{Config, Environment};
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize)]
pub struct ClinicConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub prometheus: PrometheusConfig,
    pub development: Option<DevelopmentConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "PrometheusConfig::default_port")]
    pub port: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DevelopmentConfig {
    #[serde(default)]
    pub disable_database_tls: bool,
}

/// Config defaults to a file called `clinic.toml` in the current directory.
/// Supports TOML and JSON.
/// Variable names should match the struct field names.
///
/// ENV vars can be used to override file settings.
///
/// ENV vars must be prefixed with `CLINIC_`.
///
impl ClinicConfig {
    pub fn load(args: &Args) -> Result<ClinicConfig, Error> {
        // Log a warning to user that config file is missing
        if !PathBuf::from(&args.config_file_path).exists() {
            println!(
                "Configuration file was not found: {}",
                args.config_file_path
            );
            println!("Loading config values from environment variables.");
        }
        let mut config = ClinicConfig::build(&args.config_file_path)?;

        // If log level is default, it has not been set by the user in config
        if config.log.level == LogConfig::default_log_level() {
            config.log.level = args.log_level;
        }

        // If log format is default, it has not been set by the user in config
        if config.log.format == LogConfig::default_log_format() {
            config.log.format = args.log_format;
        }

        Ok(config)
    }

    pub fn build(path: &str) -> Result<Self, Error> {
        // For parsing top-level values such as CLINIC_HOST, CLINIC_PORT
        // and for parsing nested env values such as CLINIC_DATABASE__HOST, CLINIC_DATABASE__PORT
        let env_source = Environment::with_prefix(CLINIC_PREFIX)
            .try_parsing(true)
            .separator("__")
            .prefix_separator("_");

        let config: Self = Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(env_source)
            .build()?
            .try_deserialize()
            .map_err(|err| match err {
                config::ConfigError::NotFound(name) => ConfigError::MissingParameter { name },
                config::ConfigError::Message(ref s)
                    if s.contains("does not have variant constructor") =>
                {
                    let (name, value) = extract_invalid_field(s);
                    ConfigError::InvalidParameter { name, value }
                }
                _ => err.into(),
            })?;

        Ok(config)
    }

    pub fn database_tls_disabled(&self) -> bool {
        match &self.development {
            Some(dev) => dev.disable_database_tls,
            None => false,
        }
    }

    pub fn use_structured_logging(&self) -> bool {
        matches!(self.log.format, LogFormat::Structured)
    }

    ///
    /// Returns true if Prometheus export is enabled
    ///
    pub fn prometheus_enabled(&self) -> bool {
        self.prometheus.enabled
    }
}

impl PrometheusConfig {
    pub fn default_port() -> u16 {
        9930
    }
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        PrometheusConfig {
            enabled: false,
            port: PrometheusConfig::default_port(),
        }
    }
}

///
/// Extracts a field name (if present) from a config::ConfigError::Message
/// This is called in `build` if a ConfigError message contains the string `does not have variant constructor`
///
/// Error string is `enum {name} does not have variant constructor {value}`
///
fn extract_invalid_field(input: &str) -> (String, String) {
    let unknown = || ("unknown".to_string(), "".to_string());

    let Ok(re) = Regex::new(r"^enum (\w+) does not have variant constructor (\S+)") else {
        return unknown();
    };

    re.captures(input)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .unwrap_or_else(unknown)
}

#[cfg(test)]
mod tests {
    use super::extract_invalid_field;
    use crate::{
        config::ClinicConfig,
        error::{ConfigError, Error},
        test_helpers::with_no_clinic_vars,
    };

    const TEST_CONFIG: &str = "tests/config/clinic-test.toml";

    #[test]
    fn test_database_as_url() {
        with_no_clinic_vars(|| {
            let config = ClinicConfig::build(TEST_CONFIG).unwrap();
            assert_eq!(
                config.database.to_socket_address(),
                "localhost:5532".to_string()
            );
            assert_eq!(config.database.name, "clinic");
        });
    }

    #[test]
    fn server_defaults_when_section_missing() {
        with_no_clinic_vars(|| {
            let config = ClinicConfig::build(TEST_CONFIG).unwrap();
            assert_eq!(config.server.port, 2022);
            assert_eq!(config.server.host, "0.0.0.0");
        });
    }

    #[test]
    fn env_overrides_file() {
        with_no_clinic_vars(|| {
            temp_env::with_vars(
                [
                    ("CLINIC_SERVER__PORT", Some("8080")),
                    ("CLINIC_DATABASE__HOST", Some("db.internal")),
                ],
                || {
                    let config = ClinicConfig::build(TEST_CONFIG).unwrap();
                    assert_eq!(config.server.port, 8080);
                    assert_eq!(config.database.host, "db.internal");
                },
            );
        });
    }

    #[test]
    fn auth_defaults_to_fixed_accounts() {
        with_no_clinic_vars(|| {
            let config = ClinicConfig::build(TEST_CONFIG).unwrap();
            assert!(config.auth.superadmin.matches("admin", "password"));
            assert!(config.auth.doctor.matches("doctor1", "password"));
            assert_eq!(config.auth.doctor_profile_id, 1);
        });
    }

    #[test]
    fn development_config() {
        with_no_clinic_vars(|| {
            let config = ClinicConfig::build(TEST_CONFIG).unwrap();
            assert!(!config.database_tls_disabled());

            temp_env::with_vars(
                [("CLINIC_DEVELOPMENT__DISABLE_DATABASE_TLS", Some("true"))],
                || {
                    let config = ClinicConfig::build(TEST_CONFIG).unwrap();
                    assert!(config.database_tls_disabled());
                },
            );
        });
    }

    #[test]
    fn missing_database_name_is_reported() {
        with_no_clinic_vars(|| {
            let config = ClinicConfig::build("tests/config/clinic-missing-database-name.toml");

            match config {
                Err(Error::Config(ConfigError::MissingParameter { name })) => {
                    assert_eq!(name, "database.name");
                }
                other => panic!("Expected MissingParameter, got {other:?}"),
            }
        });
    }

    #[test]
    fn missing_database_section_is_reported() {
        with_no_clinic_vars(|| {
            let config = ClinicConfig::build("tests/config/no-such-file.toml");

            match config {
                Err(Error::Config(ConfigError::MissingParameter { name })) => {
                    assert_eq!(name, "database");
                }
                other => panic!("Expected MissingParameter, got {other:?}"),
            }
        });
    }

    #[test]
    fn prometheus_config() {
        with_no_clinic_vars(|| {
            let config = ClinicConfig::build(TEST_CONFIG).unwrap();
            assert!(!config.prometheus_enabled());

            temp_env::with_vars([("CLINIC_PROMETHEUS__ENABLED", Some("true"))], || {
                let config = ClinicConfig::build(TEST_CONFIG).unwrap();
                assert!(config.prometheus_enabled());
                assert_eq!(config.prometheus.port, 9930);
            });

            temp_env::with_vars([("CLINIC_PROMETHEUS__PORT", Some("7777"))], || {
                let config = ClinicConfig::build(TEST_CONFIG).unwrap();
                assert!(!config.prometheus_enabled());
                assert_eq!(config.prometheus.port, 7777);
            });
        });
    }

    #[test]
    fn extracts_names_from_config_messages() {
        assert_eq!(
            extract_invalid_field("enum LogFormat does not have variant constructor dEbUG"),
            ("LogFormat".to_string(), "dEbUG".to_string())
        );
        assert_eq!(
            extract_invalid_field("something else"),
            ("unknown".to_string(), "".to_string())
        );
    }
}
