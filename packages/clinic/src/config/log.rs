use std::{fmt::Display, io::IsTerminal};

use clap::ValueEnum;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_ansi_enabled")]
    pub ansi_enabled: bool,

    #[serde(default = "LogConfig::default_log_format")]
    pub format: LogFormat,

    #[serde(default = "LogConfig::default_log_output")]
    pub output: LogOutput,

    #[serde(default = "LogConfig::default_log_level")]
    pub level: LogLevel,

    // Log target level fields - generated from define_log_targets! macro
    #[serde(default = "LogConfig::default_log_level")]
    pub development_level: LogLevel,

    #[serde(default = "LogConfig::default_log_level")]
    pub authentication_level: LogLevel,

    #[serde(default = "LogConfig::default_log_level")]
    pub config_level: LogLevel,

    #[serde(default = "LogConfig::default_log_level")]
    pub rpc_level: LogLevel,

    #[serde(default = "LogConfig::default_log_level")]
    pub store_level: LogLevel,

    #[serde(default = "LogConfig::default_log_level")]
    pub schema_level: LogLevel,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    // Serde does not seem to have a case insensitive option. alias is clunky, but better than custom de/serialisers
    #[serde(alias = "Pretty", alias = "pretty", alias = "PRETTY")]
    Pretty,
    #[serde(alias = "Structured", alias = "structured", alias = "STRUCTURED")]
    Structured,
    #[serde(alias = "Text", alias = "text", alias = "TEXT")]
    Text,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[serde(alias = "Stdout", alias = "stdout", alias = "STDOUT")]
    Stdout,
    #[serde(alias = "Stderr", alias = "stderr", alias = "STDERR")]
    Stderr,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(alias = "Error", alias = "error", alias = "ERROR")]
    Error,
    #[serde(alias = "Warn", alias = "warn", alias = "WARN")]
    Warn,
    #[serde(alias = "Info", alias = "info", alias = "INFO")]
    Info,
    #[serde(alias = "Debug", alias = "debug", alias = "DEBUG")]
    Debug,
    #[serde(alias = "Trace", alias = "trace", alias = "TRACE")]
    Trace,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        write!(f, "{s}")
    }
}

impl LogLevel {
    pub fn is_debug(&self) -> bool {
        matches!(self, LogLevel::Debug | LogLevel::Trace)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::with_level(LogConfig::default_log_level())
    }
}

impl LogConfig {
    pub fn with_level(level: LogLevel) -> Self {
        LogConfig {
            format: LogConfig::default_log_format(),
            output: LogConfig::default_log_output(),
            ansi_enabled: LogConfig::default_ansi_enabled(),
            level,
            // Log target level field assignments - matches define_log_targets! macro
            development_level: level,
            authentication_level: level,
            config_level: level,
            rpc_level: level,
            store_level: level,
            schema_level: level,
        }
    }

    pub fn default_log_format() -> LogFormat {
        if std::io::stdout().is_terminal() {
            LogFormat::Pretty
        } else {
            LogFormat::Structured
        }
    }

    pub fn default_ansi_enabled() -> bool {
        std::io::stdout().is_terminal()
    }

    pub const fn default_log_output() -> LogOutput {
        LogOutput::Stdout
    }

    pub const fn default_log_level() -> LogLevel {
        LogLevel::Info
    }
}
