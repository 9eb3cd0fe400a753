mod auth;
mod clinic;
mod database;
mod log;
mod server;

pub use auth::{AuthConfig, Credentials};
pub use clinic::{ClinicConfig, DevelopmentConfig, PrometheusConfig};
pub use database::DatabaseConfig;
pub use log::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use server::ServerConfig;

pub const CLINIC_PREFIX: &str = "CLINIC";
pub const DEFAULT_CONFIG_FILE_PATH: &str = "clinic.toml";

pub const DEFAULT_PORT: u16 = 2022;
pub const DEFAULT_SHUTDOWN_TIMEOUT: u64 = 2000;
pub const DEFAULT_WORKER_THREADS: usize = 4;
