use crate::error::{Error, RecordError};
use crate::log::STORE;
use crate::model::{ById, CreatePatient, NewPatient, Patient, SearchPatients, UpdatePatient};
use crate::prometheus::PATIENTS_REGISTERED_TOTAL;
use crate::store::ClinicStore;
use metrics::counter;
use tracing::{debug, info};

///
/// Formats the public identifier that follows the highest internal id,
/// `P001` for an empty table. Widens past `P999`.
///
pub fn next_patient_id(last: Option<i32>) -> String {
    format!("P{:03}", i64::from(last.unwrap_or(0)) + 1)
}

///
/// Fails when a patient already holds the supplied cnic or phone.
/// Only the first matching row is inspected, cnic before phone.
///
async fn require_unique_contact(
    store: &dyn ClinicStore,
    cnic: Option<&str>,
    phone: Option<&str>,
) -> Result<(), Error> {
    let existing = store.patients_with_contact(cnic, phone).await?;

    match existing.first() {
        Some(patient) if cnic.is_some() && patient.cnic.as_deref() == cnic => {
            Err(RecordError::DuplicateCnic.into())
        }
        Some(_) => Err(RecordError::DuplicatePhone.into()),
        None => Ok(()),
    }
}

///
/// Registers a patient under the next sequential `P###` identifier.
///
/// Allocation reads the current highest id without locking, so concurrent
/// registrations can collide on `patient_id` and fail with a unique violation.
///
pub async fn create_patient(
    store: &dyn ClinicStore,
    input: CreatePatient,
) -> Result<Patient, Error> {
    let input = input.normalize();
    input.validate()?;

    require_unique_contact(store, input.cnic.as_deref(), input.phone.as_deref()).await?;

    let last = store.last_patient_id().await?;
    let patient = NewPatient {
        patient_id: next_patient_id(last),
        cnic: input.cnic,
        phone: input.phone,
        name: input.name,
    };

    let patient = store.insert_patient(&patient).await?;
    counter!(PATIENTS_REGISTERED_TOTAL).increment(1);
    info!(target: STORE, msg = "Registered patient", id = patient.id, patient_id = %patient.patient_id);
    Ok(patient)
}

pub async fn get_patients(store: &dyn ClinicStore) -> Result<Vec<Patient>, Error> {
    store.patients().await
}

pub async fn get_patient_by_id(
    store: &dyn ClinicStore,
    input: ById,
) -> Result<Option<Patient>, Error> {
    store.patient(input.id).await
}

///
/// Blank queries match nothing.
///
pub async fn search_patients(
    store: &dyn ClinicStore,
    input: SearchPatients,
) -> Result<Vec<Patient>, Error> {
    let query = input.query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let patients = store.search_patients(query).await?;
    debug!(target: STORE, msg = "Patient search", query, results = patients.len());
    Ok(patients)
}

///
/// With nothing to change the current record is returned as is.
/// Contact collisions surface as the store's unique violation.
///
pub async fn update_patient(
    store: &dyn ClinicStore,
    input: UpdatePatient,
) -> Result<Option<Patient>, Error> {
    let (id, changes) = input.into_parts();

    if changes.is_empty() {
        return store.patient(id).await;
    }

    store.update_patient(id, &changes).await
}
