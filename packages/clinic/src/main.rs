use clap::Parser;
use clinic::config::ClinicConfig;
use clinic::rpc::{self, AppState};
use clinic::{cli, connect, log, prometheus, Args, PgStore, VERSION};
use std::sync::Arc;
use clinic::log::CONFIG;
use tracing::{debug, error, info};

fn main() {
    let args = Args::parse();

    let config = match ClinicConfig::load(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration Error: {}", err);
            std::process::exit(exitcode::CONFIG);
        }
    };

    log::init(config.log.clone());

    debug!(
        target: CONFIG,
        msg = "Configuration loaded",
        server = ?config.server,
        database = %config.database,
        structured_logging = config.use_structured_logging(),
        prometheus = config.prometheus_enabled(),
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.worker_threads)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(msg = "Could not start runtime", error = err.to_string());
            std::process::exit(exitcode::OSERR);
        }
    };

    runtime.block_on(start(args, config));
}

async fn start(args: Args, config: ClinicConfig) {
    match cli::run(args, &config).await {
        Ok(true) => return,
        Ok(false) => {}
        Err(err) => {
            error!(msg = "Command failed", error = err.to_string());
            std::process::exit(exitcode::UNAVAILABLE);
        }
    }

    info!(msg = "Starting Clinic", version = VERSION);

    let address = match config.server.socket_addr() {
        Ok(address) => address,
        Err(err) => {
            error!(msg = "Could not start Clinic", error = err.to_string());
            std::process::exit(exitcode::CONFIG);
        }
    };

    if config.prometheus_enabled() {
        if let Err(err) = prometheus::start(address.ip(), config.prometheus.port) {
            error!(msg = "Could not start Prometheus exporter", error = err.to_string());
            std::process::exit(exitcode::CONFIG);
        }
    }

    let client = match connect::database(&config).await {
        Ok(client) => client,
        Err(err) => {
            error!(msg = "Could not start Clinic", error = err.to_string());
            std::process::exit(exitcode::UNAVAILABLE);
        }
    };

    let listener = match connect::bind_with_retry(&config.server).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(msg = "Could not bind server", address = %address, error = err.to_string());
            std::process::exit(exitcode::CONFIG);
        }
    };

    let state = AppState::new(Arc::new(PgStore::new(client)), config.auth.clone());

    if let Err(err) = rpc::serve(listener, state, config.server.shutdown_timeout()).await {
        error!(msg = "Server error", error = err.to_string());
        std::process::exit(exitcode::SOFTWARE);
    }

    info!(msg = "Clinic stopped");
}
