use crate::error::{Error, RecordError};
use crate::log::STORE;
use crate::model::{ById, CreateLocation, DeleteResult, Location, UpdateLocation};
use crate::store::ClinicStore;
use tracing::{debug, info};

pub async fn create_location(
    store: &dyn ClinicStore,
    input: CreateLocation,
) -> Result<Location, Error> {
    input.validate()?;

    let location = store.insert_location(&input).await?;
    info!(target: STORE, msg = "Created location", id = location.id);
    Ok(location)
}

pub async fn get_locations(store: &dyn ClinicStore) -> Result<Vec<Location>, Error> {
    store.locations().await
}

pub async fn get_location_by_id(
    store: &dyn ClinicStore,
    input: ById,
) -> Result<Option<Location>, Error> {
    store.location(input.id).await
}

///
/// Returns `None` when nothing is supplied to change or the id is unknown.
///
pub async fn update_location(
    store: &dyn ClinicStore,
    input: UpdateLocation,
) -> Result<Option<Location>, Error> {
    input.validate()?;

    let (id, changes) = input.into_parts();
    if changes.is_empty() {
        debug!(target: STORE, msg = "Empty location update", id);
        return Ok(None);
    }

    store.update_location(id, &changes).await
}

///
/// Refuses to delete a location while any doctor is assigned to it.
///
pub async fn delete_location(
    store: &dyn ClinicStore,
    input: ById,
) -> Result<DeleteResult, Error> {
    let id = input.id;

    if store.location(id).await?.is_none() {
        return Err(RecordError::LocationNotFound { id }.into());
    }

    let count = store.count_doctors_at(id).await?;
    if count > 0 {
        return Err(RecordError::LocationHasDoctors { count }.into());
    }

    store.delete_location(id).await?;
    info!(target: STORE, msg = "Deleted location", id);
    Ok(DeleteResult::new(true))
}
