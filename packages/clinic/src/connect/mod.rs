use crate::error::{Error, StoreError};
use crate::log::DEVELOPMENT;
use crate::{tls, ClinicConfig, ServerConfig};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};
use tokio_postgres::{Client, NoTls, Socket};
use tracing::{debug, error, info, warn};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(2);
const MAX_RETRY_COUNT: u32 = 3;

fn retry_delay(retry_count: u32) -> Duration {
    let sleep_duration_ms = (100 * 2_u64.pow(retry_count)).min(MAX_RETRY_DELAY.as_millis() as _);
    Duration::from_millis(sleep_duration_ms)
}

///
/// Connect to the clinic database.
///
/// The connection future is driven on its own task for the life of the process.
/// TLS is used unless `development.disable_database_tls` is set.
///
pub async fn database(config: &ClinicConfig) -> Result<Client, Error> {
    if config.database_tls_disabled() {
        warn!(msg = "Database Transport Layer Security (TLS) is disabled");
        return connect_with_retry(config, NoTls).await;
    }

    if !config.database.with_tls_verification {
        warn!(msg = "Bypassing Transport Layer Security (TLS) verification for database connections");
    }

    let tls_config = tls::configure_client(&config.database);
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
    connect_with_retry(config, tls).await
}

async fn connect_with_retry<T>(config: &ClinicConfig, tls: T) -> Result<Client, Error>
where
    T: MakeTlsConnect<Socket> + Clone,
    T::Stream: Send + 'static,
    T::TlsConnect: Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let db_config = config.database.connection_config();
    let mut retry_count = 0;

    loop {
        debug!(target: DEVELOPMENT, msg = "Connecting to database", database = %config.database);

        match db_config.connect(tls.clone()).await {
            Ok((client, connection)) => {
                tokio::spawn(async move {
                    if let Err(err) = connection.await {
                        error!(msg = "Database connection error", error = err.to_string());
                    }
                });

                info!(
                    msg = "Database connected",
                    database = config.database.name,
                    host = config.database.host,
                    port = config.database.port,
                );
                return Ok(client);
            }
            Err(err) => {
                if retry_count >= MAX_RETRY_COUNT {
                    error!(
                        msg = "Could not connect to database",
                        database = config.database.name,
                        host = config.database.host,
                        port = config.database.port,
                        username = config.database.username,
                        error = err.to_string()
                    );
                    error!(msg = "Confirm that the database configuration is correct");
                    return Err(StoreError::Connection {
                        retries: retry_count,
                    }
                    .into());
                }
            }
        }

        time::sleep(retry_delay(retry_count)).await;
        retry_count += 1;
    }
}

pub async fn bind_with_retry(server: &ServerConfig) -> Result<TcpListener, Error> {
    let address = server.socket_addr()?;
    let mut retry_count = 0;

    loop {
        match TcpListener::bind(address).await {
            Ok(listener) => {
                info!(msg = "Server waiting for connections", address = %address);
                return Ok(listener);
            }
            Err(err) => {
                if retry_count >= MAX_RETRY_COUNT {
                    error!(
                        msg = "Error binding connection",
                        retries = MAX_RETRY_COUNT,
                        error = err.to_string()
                    );
                    return Err(err.into());
                }
            }
        };

        time::sleep(retry_delay(retry_count)).await;
        retry_count += 1;
    }
}
