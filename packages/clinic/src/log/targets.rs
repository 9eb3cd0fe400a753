use crate::config::LogLevel;

// Define all log targets in one place
macro_rules! define_log_targets {
    ($(($const_name:ident, $field_name:ident, $target_str:literal)),* $(,)?) => {
        $(
            pub const $const_name: &str = $target_str;
        )*

        pub fn log_targets() -> Vec<&'static str> {
            vec![
                $(
                    $const_name,
                )*
            ]
        }

        pub fn log_level_for(config: &crate::config::LogConfig, target: &str) -> LogLevel {
            match target {
                $(
                    $const_name => config.$field_name,
                )*
                _ => config.level,
            }
        }

        // Fails to compile if a target has no matching LogConfig field
        pub const fn validate_log_config_fields() {
            use crate::config::LogConfig;

            let _config = LogConfig {
                ansi_enabled: true,
                format: crate::config::LogFormat::Pretty,
                output: crate::config::LogOutput::Stdout,
                level: LogLevel::Info,
                $(
                    $field_name: LogLevel::Info,
                )*
            };
        }

        // NOTE: LogConfig fields in config/log.rs must be kept in sync with the targets defined here.
        //
        // When adding a new target (NEWTARGET, new_target_level, "new_target"):
        // 1. Add the target to the define_log_targets! macro invocation below
        // 2. Add the `new_target_level` field to LogConfig in config/log.rs
        // 3. Add `new_target_level: level` to LogConfig::with_level()
    };
}

define_log_targets!(
    (DEVELOPMENT, development_level, "development"),
    (AUTHENTICATION, authentication_level, "authentication"),
    (CONFIG, config_level, "config"),
    (RPC, rpc_level, "rpc"),
    (STORE, store_level, "store"),
    (SCHEMA, schema_level, "schema"),
);

const _: () = validate_log_config_fields();
