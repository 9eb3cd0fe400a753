use crate::error::{Error, RecordError};
use crate::log::STORE;
use crate::model::{ById, ByLocation, CreateDoctor, DeleteResult, Doctor, UpdateDoctor};
use crate::store::ClinicStore;
use tracing::{debug, info};

async fn require_location(store: &dyn ClinicStore, id: i32) -> Result<(), Error> {
    match store.location(id).await? {
        Some(_) => Ok(()),
        None => Err(RecordError::MissingLocation { id }.into()),
    }
}

pub async fn create_doctor(store: &dyn ClinicStore, input: CreateDoctor) -> Result<Doctor, Error> {
    input.validate()?;
    require_location(store, input.location_id).await?;

    let doctor = store.insert_doctor(&input).await?;
    info!(target: STORE, msg = "Created doctor", id = doctor.id, location_id = doctor.location_id);
    Ok(doctor)
}

/// Doctors whose location still exists
pub async fn get_doctors(store: &dyn ClinicStore) -> Result<Vec<Doctor>, Error> {
    store.doctors().await
}

pub async fn get_doctor_by_id(
    store: &dyn ClinicStore,
    input: ById,
) -> Result<Option<Doctor>, Error> {
    store.doctor(input.id).await
}

pub async fn get_doctors_by_location(
    store: &dyn ClinicStore,
    input: ByLocation,
) -> Result<Vec<Doctor>, Error> {
    store.doctors_at(input.location_id).await
}

///
/// Returns `None` when nothing is supplied to change or the id is unknown.
/// A supplied location must exist before anything is written.
///
pub async fn update_doctor(
    store: &dyn ClinicStore,
    input: UpdateDoctor,
) -> Result<Option<Doctor>, Error> {
    input.validate()?;

    let (id, changes) = input.into_parts();
    if changes.is_empty() {
        debug!(target: STORE, msg = "Empty doctor update", id);
        return Ok(None);
    }

    if let Some(location_id) = changes.location_id {
        require_location(store, location_id).await?;
    }

    store.update_doctor(id, &changes).await
}

///
/// Refuses to delete a doctor with recorded visits.
///
pub async fn delete_doctor(store: &dyn ClinicStore, input: ById) -> Result<DeleteResult, Error> {
    let id = input.id;

    if store.doctor(id).await?.is_none() {
        return Err(RecordError::DoctorNotFound { id }.into());
    }

    if store.doctor_has_visits(id).await? {
        return Err(RecordError::DoctorHasVisits { id }.into());
    }

    store.delete_doctor(id).await?;
    info!(target: STORE, msg = "Deleted doctor", id);
    Ok(DeleteResult::new(true))
}
