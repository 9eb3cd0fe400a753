pub mod cli;
pub mod config;
pub mod connect;
pub mod error;
pub mod handlers;
pub mod log;
pub mod model;
pub mod prometheus;
pub mod rpc;
pub mod store;
pub mod tls;

pub use crate::cli::Args;
pub use crate::config::{ClinicConfig, DatabaseConfig, ServerConfig};
pub use crate::log::init;
pub use crate::store::{ClinicStore, PgStore};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub mod test_helpers;
