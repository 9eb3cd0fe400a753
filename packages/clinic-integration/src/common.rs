#![allow(dead_code)]

use clinic::model::{CreateDoctor, CreateLocation, Doctor, Location};
use clinic::{handlers, PgStore};
use rand::{distr::Alphanumeric, Rng};
use std::sync::Once;
use tokio::sync::OnceCell;
use tokio_postgres::{Client, NoTls};
use tracing_subscriber::{filter::Directive, EnvFilter, FmtSubscriber};

pub const PG_PORT: u16 = 5532;

static INIT: Once = Once::new();
static SCHEMA: OnceCell<()> = OnceCell::const_new();

pub fn random_string() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(10) // Length of string
        .map(char::from)
        .collect()
}

pub fn trace() {
    INIT.call_once(|| {
        let log_level: Directive = tracing::Level::DEBUG.into();

        let filter = EnvFilter::from_default_env().add_directive(log_level.to_owned());

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

pub fn connection_config(port: u16) -> tokio_postgres::Config {
    let mut db_config = tokio_postgres::Config::new();

    db_config
        .host("localhost")
        .port(port)
        .user("clinic")
        .password("p@ssword")
        .dbname("clinic");

    db_config
}

pub async fn connect(port: u16) -> Client {
    let connection_config = connection_config(port);
    let (client, connection) = connection_config.connect(NoTls).await.unwrap();

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {}", e);
        }
    });

    client
}

///
/// Store with the schema installed.
/// Tests share one database, so every record they create uses random values.
///
pub async fn store() -> PgStore {
    trace();
    let store = PgStore::new(connect(PG_PORT).await);
    SCHEMA
        .get_or_init(|| async { store.install_schema().await.unwrap() })
        .await;
    store
}

pub async fn location(store: &PgStore) -> Location {
    let input = CreateLocation {
        name: format!("Clinic {}", random_string()),
        address: "1 St".to_string(),
    };
    handlers::create_location(store, input).await.unwrap()
}

pub async fn doctor(store: &PgStore, location_id: i32) -> Doctor {
    let input = CreateDoctor {
        name: format!("Dr. {}", random_string()),
        contact_number: "0300-1234567".to_string(),
        location_id,
        timings: "9-5".to_string(),
    };
    handlers::create_doctor(store, input).await.unwrap()
}
