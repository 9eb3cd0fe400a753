use crate::error::Error;
use crate::log::DEVELOPMENT;
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, info};

// See https://prometheus.io/docs/practices/naming/
pub const RPC_CALLS_TOTAL: &str = "clinic_rpc_calls_total";
pub const RPC_ERRORS_TOTAL: &str = "clinic_rpc_errors_total";
pub const RPC_DURATION_SECONDS: &str = "clinic_rpc_duration_seconds";

pub const PATIENTS_REGISTERED_TOTAL: &str = "clinic_patients_registered_total";
pub const RPC_ACTIVE_REQUESTS: &str = "clinic_rpc_active_requests";

pub fn start(host: IpAddr, port: u16) -> Result<(), Error> {
    let socket_address = SocketAddr::new(host, port);

    debug!(target: DEVELOPMENT, msg = "Starting Prometheus exporter", port);

    PrometheusBuilder::new()
        .with_http_listener(socket_address)
        .install()?;

    describe_counter!(RPC_CALLS_TOTAL, "Number of RPC procedure calls");
    describe_counter!(RPC_ERRORS_TOTAL, "Number of RPC procedure calls that failed");
    describe_histogram!(
        RPC_DURATION_SECONDS,
        Unit::Seconds,
        "Duration of RPC procedure calls"
    );
    describe_counter!(PATIENTS_REGISTERED_TOTAL, "Number of patients registered");
    describe_gauge!(RPC_ACTIVE_REQUESTS, "Current number of RPC calls in flight");

    // Prometheus endpoint is empty on startup and looks like an error
    // Explicitly set count to zero
    gauge!(RPC_ACTIVE_REQUESTS).set(0);

    info!(msg = "Prometheus exporter started", port);
    Ok(())
}
