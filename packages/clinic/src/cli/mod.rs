use crate::{
    config::{LogConfig, LogFormat, LogLevel, DEFAULT_CONFIG_FILE_PATH},
    connect,
    error::Error,
    log::SCHEMA,
    ClinicConfig, PgStore,
};
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Clone, Debug, Parser)]
#[command(version, about, verbatim_doc_comment)]
///
/// Clinic
///
/// Records clinic locations, doctors, patients and visits behind a JSON RPC API.
///
pub struct Args {
    /// Optional path to a Clinic configuration file.
    ///
    /// Default is "clinic.toml".
    /// Configuration is loaded from this file, if present.
    /// Environment variables are used instead of the file or to override any values defined in the file.
    #[arg(short = 'p', long, default_value = DEFAULT_CONFIG_FILE_PATH, verbatim_doc_comment, global = true)]
    pub config_file_path: String,

    ///
    /// Optional log level.
    ///
    #[arg(short, long, value_enum, default_value_t = LogConfig::default_log_level(), env = "CLINIC_LOG__LEVEL", global = true)]
    pub log_level: LogLevel,

    ///
    /// Optional log format. Default level is "pretty" if running in a terminal session, otherwise "structured".
    ///
    #[arg(short='f', long, value_enum, default_value_t = LogConfig::default_log_format(), env = "CLINIC_LOG__FORMAT", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the clinic tables and indexes if they do not exist
    Schema,
}

///
/// Runs command specified in command line
/// Returns Ok(true) if the caller should exit
///
pub async fn run(args: Args, config: &ClinicConfig) -> Result<bool, Error> {
    match args.command {
        Some(Commands::Schema) => {
            debug!(target: SCHEMA, msg = "Schema command", database = %config.database);
            let client = connect::database(config).await?;
            PgStore::new(client).install_schema().await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["clinic"]).unwrap();
        assert_eq!(args.config_file_path, "clinic.toml");
        assert!(args.command.is_none());
    }

    #[test]
    fn schema_command() {
        let args = Args::try_parse_from(["clinic", "schema", "-p", "custom.toml"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Schema)));
        assert_eq!(args.config_file_path, "custom.toml");
    }
}
