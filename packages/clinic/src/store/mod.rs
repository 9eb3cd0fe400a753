mod postgres;

pub use postgres::{PgStore, SCHEMA_SQL};

use crate::error::Error;
use crate::model::{
    CreateDoctor, CreateLocation, Doctor, DoctorChanges, Location, LocationChanges, NewPatient,
    NewVisit, Patient, PatientChanges, Visit, VisitChanges,
};

///
/// Persistence for the four clinic tables.
///
/// Every method is a single statement against one table (or a join of two).
/// Business rules such as delete guards and patient id allocation live in
/// `handlers`, which receive the store explicitly.
///
/// `update_*` methods return `None` when no row has the given id.
/// `delete_*` methods return `true` when a row was removed.
///
#[async_trait::async_trait]
pub trait ClinicStore: Send + Sync {
    async fn insert_location(&self, location: &CreateLocation) -> Result<Location, Error>;

    async fn locations(&self) -> Result<Vec<Location>, Error>;

    async fn location(&self, id: i32) -> Result<Option<Location>, Error>;

    async fn update_location(
        &self,
        id: i32,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, Error>;

    async fn delete_location(&self, id: i32) -> Result<bool, Error>;

    /// Number of doctors assigned to the location
    async fn count_doctors_at(&self, location_id: i32) -> Result<i64, Error>;

    async fn insert_doctor(&self, doctor: &CreateDoctor) -> Result<Doctor, Error>;

    /// Doctors joined with their location
    async fn doctors(&self) -> Result<Vec<Doctor>, Error>;

    async fn doctor(&self, id: i32) -> Result<Option<Doctor>, Error>;

    async fn doctors_at(&self, location_id: i32) -> Result<Vec<Doctor>, Error>;

    async fn update_doctor(
        &self,
        id: i32,
        changes: &DoctorChanges,
    ) -> Result<Option<Doctor>, Error>;

    async fn delete_doctor(&self, id: i32) -> Result<bool, Error>;

    async fn doctor_has_visits(&self, doctor_id: i32) -> Result<bool, Error>;

    async fn insert_patient(&self, patient: &NewPatient) -> Result<Patient, Error>;

    async fn patients(&self) -> Result<Vec<Patient>, Error>;

    async fn patient(&self, id: i32) -> Result<Option<Patient>, Error>;

    /// Highest internal patient id, if any patient exists
    async fn last_patient_id(&self) -> Result<Option<i32>, Error>;

    /// Patients whose cnic equals `cnic` OR whose phone equals `phone`.
    /// A `None` argument matches nothing.
    async fn patients_with_contact(
        &self,
        cnic: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<Patient>, Error>;

    /// Case-insensitive substring search over patient_id, cnic, phone and name
    async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, Error>;

    async fn update_patient(
        &self,
        id: i32,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, Error>;

    async fn insert_visit(&self, visit: &NewVisit) -> Result<Visit, Error>;

    async fn visits(&self) -> Result<Vec<Visit>, Error>;

    async fn visit(&self, id: i32) -> Result<Option<Visit>, Error>;

    /// Most recent visit first
    async fn visits_for_patient(&self, patient_id: i32) -> Result<Vec<Visit>, Error>;

    async fn update_visit(&self, id: i32, changes: &VisitChanges)
        -> Result<Option<Visit>, Error>;

    async fn delete_visit(&self, id: i32) -> Result<bool, Error>;
}
