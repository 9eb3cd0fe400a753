//! JSON-over-HTTP procedure calls.
//!
//! `POST /rpc/{procedure}` carries the input as the request body and
//! `GET /rpc/{procedure}?input=<json>` carries it in the query string and
//! serves query procedures only.
//! Successful calls answer `{"result":{"data":...}}`, failures answer
//! `{"error":{"code":...,"message":...}}` with a matching HTTP status.

mod procedure;
mod response;
mod server;

pub use procedure::{Kind, Procedure};
pub use response::{Failure, Success};
pub use server::{router, serve};

use crate::config::AuthConfig;
use crate::error::{Error, ErrorCode};
use crate::handlers;
use crate::log::RPC;
use crate::prometheus::{RPC_ACTIVE_REQUESTS, RPC_CALLS_TOTAL, RPC_DURATION_SECONDS, RPC_ERRORS_TOTAL};
use crate::store::ClinicStore;
use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

pub struct AppState {
    pub store: Arc<dyn ClinicStore>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn ClinicStore>, auth: AuthConfig) -> Self {
        AppState { store, auth }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl Health {
    pub fn ok() -> Self {
        Health {
            status: "ok",
            timestamp: Utc::now(),
        }
    }
}

fn input<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    Ok(serde_json::from_value(value)?)
}

fn output<T: Serialize>(value: T) -> Result<Value, Error> {
    Ok(serde_json::to_value(value)?)
}

///
/// Runs a named procedure, recording metrics and logging failures.
///
/// `value` is the already-decoded input, or the error from decoding it.
///
pub async fn call(
    state: &AppState,
    name: &str,
    value: Result<Value, Error>,
) -> Result<Value, Error> {
    let procedure = match name.parse::<Procedure>() {
        Ok(procedure) => procedure,
        Err(err) => {
            warn!(target: RPC, msg = "Unknown procedure", procedure = name);
            return Err(err.into());
        }
    };

    debug!(target: RPC, msg = "Call", procedure = procedure.name());

    let start = Instant::now();
    counter!(RPC_CALLS_TOTAL, "procedure" => procedure.name()).increment(1);
    gauge!(RPC_ACTIVE_REQUESTS).increment(1);

    let result = match value {
        Ok(value) => dispatch(state, procedure, value).await,
        Err(err) => Err(err),
    };

    gauge!(RPC_ACTIVE_REQUESTS).decrement(1);
    histogram!(RPC_DURATION_SECONDS, "procedure" => procedure.name()).record(start.elapsed());

    if let Err(err) = &result {
        counter!(RPC_ERRORS_TOTAL, "procedure" => procedure.name()).increment(1);

        match err.code() {
            ErrorCode::InternalServerError => {
                error!(target: RPC, msg = "Procedure failed", procedure = procedure.name(), error = err.to_string());
            }
            _ => {
                warn!(target: RPC, msg = "Procedure failed", procedure = procedure.name(), error = err.to_string());
            }
        }
    }

    result
}

///
/// Decodes the input for `procedure`, runs the handler and encodes its output.
/// Procedures without input ignore `value`.
///
pub async fn dispatch(
    state: &AppState,
    procedure: Procedure,
    value: Value,
) -> Result<Value, Error> {
    let store = state.store.as_ref();

    match procedure {
        Procedure::Healthcheck => output(Health::ok()),
        Procedure::Login => output(handlers::login(store, &state.auth, input(value)?).await?),

        Procedure::CreateLocation => output(handlers::create_location(store, input(value)?).await?),
        Procedure::GetLocations => output(handlers::get_locations(store).await?),
        Procedure::GetLocationById => {
            output(handlers::get_location_by_id(store, input(value)?).await?)
        }
        Procedure::UpdateLocation => output(handlers::update_location(store, input(value)?).await?),
        Procedure::DeleteLocation => output(handlers::delete_location(store, input(value)?).await?),

        Procedure::CreateDoctor => output(handlers::create_doctor(store, input(value)?).await?),
        Procedure::GetDoctors => output(handlers::get_doctors(store).await?),
        Procedure::GetDoctorById => output(handlers::get_doctor_by_id(store, input(value)?).await?),
        Procedure::GetDoctorsByLocation => {
            output(handlers::get_doctors_by_location(store, input(value)?).await?)
        }
        Procedure::UpdateDoctor => output(handlers::update_doctor(store, input(value)?).await?),
        Procedure::DeleteDoctor => output(handlers::delete_doctor(store, input(value)?).await?),

        Procedure::CreatePatient => output(handlers::create_patient(store, input(value)?).await?),
        Procedure::GetPatients => output(handlers::get_patients(store).await?),
        Procedure::GetPatientById => {
            output(handlers::get_patient_by_id(store, input(value)?).await?)
        }
        Procedure::SearchPatients => {
            output(handlers::search_patients(store, input(value)?).await?)
        }
        Procedure::UpdatePatient => output(handlers::update_patient(store, input(value)?).await?),

        Procedure::CreateVisit => output(handlers::create_visit(store, input(value)?).await?),
        Procedure::GetVisits => output(handlers::get_visits(store).await?),
        Procedure::GetVisitById => output(handlers::get_visit_by_id(store, input(value)?).await?),
        Procedure::GetVisitsByPatient => {
            output(handlers::get_visits_by_patient(store, input(value)?).await?)
        }
        Procedure::UpdateVisit => output(handlers::update_visit(store, input(value)?).await?),
        Procedure::DeleteVisit => output(handlers::delete_visit(store, input(value)?).await?),
    }
}
