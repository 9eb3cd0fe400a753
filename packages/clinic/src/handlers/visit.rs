use crate::error::{Error, RecordError};
use crate::log::STORE;
use crate::model::{ById, ByPatient, CreateVisit, DeleteResult, UpdateVisit, Visit};
use crate::store::ClinicStore;
use chrono::Utc;
use tracing::{debug, info};

async fn require_patient(store: &dyn ClinicStore, id: i32) -> Result<(), Error> {
    match store.patient(id).await? {
        Some(_) => Ok(()),
        None => Err(RecordError::MissingPatient { id }.into()),
    }
}

async fn require_doctor(store: &dyn ClinicStore, id: i32) -> Result<(), Error> {
    match store.doctor(id).await? {
        Some(_) => Ok(()),
        None => Err(RecordError::MissingDoctor { id }.into()),
    }
}

///
/// Records a visit. The visit date defaults to the current time.
///
pub async fn create_visit(store: &dyn ClinicStore, input: CreateVisit) -> Result<Visit, Error> {
    input.validate()?;
    require_patient(store, input.patient_id).await?;
    require_doctor(store, input.doctor_id).await?;

    let visit = input.into_new(Utc::now());
    let visit = store.insert_visit(&visit).await?;

    info!(
        target: STORE,
        msg = "Recorded visit",
        id = visit.id,
        patient_id = visit.patient_id,
        doctor_id = visit.doctor_id
    );
    Ok(visit)
}

pub async fn get_visits(store: &dyn ClinicStore) -> Result<Vec<Visit>, Error> {
    store.visits().await
}

pub async fn get_visit_by_id(store: &dyn ClinicStore, input: ById) -> Result<Option<Visit>, Error> {
    store.visit(input.id).await
}

/// Most recent first
pub async fn get_visits_by_patient(
    store: &dyn ClinicStore,
    input: ByPatient,
) -> Result<Vec<Visit>, Error> {
    store.visits_for_patient(input.patient_id).await
}

///
/// Returns `None` for an unknown visit and the current record when nothing
/// is supplied to change. A supplied patient or doctor must exist.
///
pub async fn update_visit(
    store: &dyn ClinicStore,
    input: UpdateVisit,
) -> Result<Option<Visit>, Error> {
    input.validate()?;

    let (id, changes) = input.into_parts();

    let Some(existing) = store.visit(id).await? else {
        debug!(target: STORE, msg = "Update of unknown visit", id);
        return Ok(None);
    };

    if changes.is_empty() {
        return Ok(Some(existing));
    }

    if let Some(patient_id) = changes.patient_id {
        require_patient(store, patient_id).await?;
    }

    if let Some(doctor_id) = changes.doctor_id {
        require_doctor(store, doctor_id).await?;
    }

    store.update_visit(id, &changes).await
}

///
/// Deletes without any guard. `success` is false when no visit had the id.
///
pub async fn delete_visit(store: &dyn ClinicStore, input: ById) -> Result<DeleteResult, Error> {
    let deleted = store.delete_visit(input.id).await?;
    info!(target: STORE, msg = "Deleted visit", id = input.id, deleted);
    Ok(DeleteResult::new(deleted))
}
