use crate::error::{Error, StoreError};
use crate::model::{
    CreateDoctor, CreateLocation, Doctor, DoctorChanges, Location, LocationChanges, NewPatient,
    NewVisit, Patient, PatientChanges, Visit, VisitChanges,
};
use crate::store::ClinicStore;
use std::collections::BTreeMap;
use std::io;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use tracing_subscriber::fmt::MakeWriter;

/// Runs a function with all CLINIC_ environment variables unset
pub(crate) fn with_no_clinic_vars<F: FnOnce() -> R, R>(f: F) -> R {
    let clinic_vars = std::env::vars()
        .map(|(k, _v)| k)
        .filter(|k| k.starts_with("CLINIC_"))
        .collect::<Vec<_>>();

    temp_env::with_vars_unset(&clinic_vars, f)
}

// Mock Writer for capturing log output, adapted from tracing_subscriber's internal test code.
pub(crate) struct MockWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MockWriter {
    fn map_error<Guard>(err: TryLockError<Guard>) -> io::Error {
        match err {
            TryLockError::WouldBlock => io::Error::from(io::ErrorKind::WouldBlock),
            TryLockError::Poisoned(_) => io::Error::from(io::ErrorKind::Other),
        }
    }

    fn buf(&self) -> io::Result<MutexGuard<'_, Vec<u8>>> {
        self.buf.try_lock().map_err(Self::map_error)
    }
}

impl io::Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buf()?.flush()
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockMakeWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MockMakeWriter {
    /// Drains everything written so far
    pub(crate) fn get_string(&self) -> String {
        let mut buf = self.buf.lock().expect("lock shouldn't be poisoned");
        let string = String::from_utf8(buf.drain(..).collect())
            .expect("formatter should not have produced invalid utf-8");
        string
    }
}

impl<'a> MakeWriter<'a> for MockMakeWriter {
    type Writer = MockWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MockWriter {
            buf: self.buf.clone(),
        }
    }
}

/// Rows keyed by a SERIAL-like id
struct Table<T> {
    serial: i32,
    rows: BTreeMap<i32, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            serial: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.serial += 1;
        self.serial
    }
}

impl<T> Deref for Table<T> {
    type Target = BTreeMap<i32, T>;

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

impl<T> DerefMut for Table<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.rows
    }
}

#[derive(Default)]
struct Tables {
    locations: Table<Location>,
    doctors: Table<Doctor>,
    patients: Table<Patient>,
    visits: Table<Visit>,
}

impl Tables {
    ///
    /// Mirrors the unique constraints on `patients`. NULL never collides.
    ///
    fn check_patient_unique(&self, candidate: &Patient) -> Result<(), Error> {
        for other in self.patients.values().filter(|p| p.id != candidate.id) {
            let constraint = if other.patient_id == candidate.patient_id {
                "patients_patient_id_unique"
            } else if candidate.cnic.is_some() && other.cnic == candidate.cnic {
                "patients_cnic_unique"
            } else if candidate.phone.is_some() && other.phone == candidate.phone {
                "patients_phone_unique"
            } else {
                continue;
            };

            return Err(StoreError::UniqueViolation {
                constraint: constraint.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Case-insensitive substring match on any identifying field, as `search_patients` does in SQL
fn matches_search(patient: &Patient, query: &str) -> bool {
    let query = query.to_lowercase();
    let contains = |field: Option<&str>| {
        field
            .map(|value| value.to_lowercase().contains(&query))
            .unwrap_or(false)
    };

    contains(Some(&patient.patient_id))
        || contains(patient.cnic.as_deref())
        || contains(patient.phone.as_deref())
        || contains(patient.name.as_deref())
}

///
/// In-memory `ClinicStore` for handler tests
///
#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("lock shouldn't be poisoned")
    }
}

#[async_trait::async_trait]
impl ClinicStore for MemoryStore {
    async fn insert_location(&self, location: &CreateLocation) -> Result<Location, Error> {
        let mut tables = self.tables();
        let location = Location {
            id: tables.locations.next_id(),
            name: location.name.clone(),
            address: location.address.clone(),
        };
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn locations(&self) -> Result<Vec<Location>, Error> {
        Ok(self.tables().locations.values().cloned().collect())
    }

    async fn location(&self, id: i32) -> Result<Option<Location>, Error> {
        Ok(self.tables().locations.get(&id).cloned())
    }

    async fn update_location(
        &self,
        id: i32,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, Error> {
        let mut tables = self.tables();
        Ok(tables.locations.get_mut(&id).map(|location| {
            changes.apply(location);
            location.clone()
        }))
    }

    async fn delete_location(&self, id: i32) -> Result<bool, Error> {
        Ok(self.tables().locations.remove(&id).is_some())
    }

    async fn count_doctors_at(&self, location_id: i32) -> Result<i64, Error> {
        let tables = self.tables();
        let count = tables
            .doctors
            .values()
            .filter(|d| d.location_id == location_id)
            .count();
        Ok(count as i64)
    }

    async fn insert_doctor(&self, doctor: &CreateDoctor) -> Result<Doctor, Error> {
        let mut tables = self.tables();
        let doctor = Doctor {
            id: tables.doctors.next_id(),
            name: doctor.name.clone(),
            contact_number: doctor.contact_number.clone(),
            location_id: doctor.location_id,
            timings: doctor.timings.clone(),
        };
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn doctors(&self) -> Result<Vec<Doctor>, Error> {
        let tables = self.tables();
        Ok(tables
            .doctors
            .values()
            .filter(|d| tables.locations.contains_key(&d.location_id))
            .cloned()
            .collect())
    }

    async fn doctor(&self, id: i32) -> Result<Option<Doctor>, Error> {
        Ok(self.tables().doctors.get(&id).cloned())
    }

    async fn doctors_at(&self, location_id: i32) -> Result<Vec<Doctor>, Error> {
        let tables = self.tables();
        Ok(tables
            .doctors
            .values()
            .filter(|d| d.location_id == location_id)
            .cloned()
            .collect())
    }

    async fn update_doctor(
        &self,
        id: i32,
        changes: &DoctorChanges,
    ) -> Result<Option<Doctor>, Error> {
        let mut tables = self.tables();
        Ok(tables.doctors.get_mut(&id).map(|doctor| {
            changes.apply(doctor);
            doctor.clone()
        }))
    }

    async fn delete_doctor(&self, id: i32) -> Result<bool, Error> {
        Ok(self.tables().doctors.remove(&id).is_some())
    }

    async fn doctor_has_visits(&self, doctor_id: i32) -> Result<bool, Error> {
        Ok(self
            .tables()
            .visits
            .values()
            .any(|v| v.doctor_id == doctor_id))
    }

    async fn insert_patient(&self, patient: &NewPatient) -> Result<Patient, Error> {
        let mut tables = self.tables();
        let mut record = Patient {
            id: 0,
            patient_id: patient.patient_id.clone(),
            cnic: patient.cnic.clone(),
            phone: patient.phone.clone(),
            name: patient.name.clone(),
        };
        tables.check_patient_unique(&record)?;

        record.id = tables.patients.next_id();
        tables.patients.insert(record.id, record.clone());
        Ok(record)
    }

    async fn patients(&self) -> Result<Vec<Patient>, Error> {
        Ok(self.tables().patients.values().cloned().collect())
    }

    async fn patient(&self, id: i32) -> Result<Option<Patient>, Error> {
        Ok(self.tables().patients.get(&id).cloned())
    }

    async fn last_patient_id(&self) -> Result<Option<i32>, Error> {
        Ok(self.tables().patients.keys().next_back().copied())
    }

    async fn patients_with_contact(
        &self,
        cnic: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<Patient>, Error> {
        let tables = self.tables();
        Ok(tables
            .patients
            .values()
            .filter(|p| {
                (cnic.is_some() && p.cnic.as_deref() == cnic)
                    || (phone.is_some() && p.phone.as_deref() == phone)
            })
            .cloned()
            .collect())
    }

    async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, Error> {
        let tables = self.tables();
        Ok(tables
            .patients
            .values()
            .filter(|p| matches_search(p, query))
            .cloned()
            .collect())
    }

    async fn update_patient(
        &self,
        id: i32,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, Error> {
        let mut tables = self.tables();
        let Some(mut patient) = tables.patients.get(&id).cloned() else {
            return Ok(None);
        };

        changes.apply(&mut patient);
        tables.check_patient_unique(&patient)?;
        tables.patients.insert(id, patient.clone());
        Ok(Some(patient))
    }

    async fn insert_visit(&self, visit: &NewVisit) -> Result<Visit, Error> {
        let mut tables = self.tables();
        let visit = Visit {
            id: tables.visits.next_id(),
            patient_id: visit.patient_id,
            doctor_id: visit.doctor_id,
            visit_date: visit.visit_date,
            symptoms: visit.symptoms.clone(),
            diagnosis: visit.diagnosis.clone(),
            prescription: visit.prescription.clone(),
            notes: visit.notes.clone(),
            follow_up_date: visit.follow_up_date,
        };
        tables.visits.insert(visit.id, visit.clone());
        Ok(visit)
    }

    async fn visits(&self) -> Result<Vec<Visit>, Error> {
        Ok(self.tables().visits.values().cloned().collect())
    }

    async fn visit(&self, id: i32) -> Result<Option<Visit>, Error> {
        Ok(self.tables().visits.get(&id).cloned())
    }

    async fn visits_for_patient(&self, patient_id: i32) -> Result<Vec<Visit>, Error> {
        let tables = self.tables();
        let mut visits = tables
            .visits
            .values()
            .filter(|v| v.patient_id == patient_id)
            .cloned()
            .collect::<Vec<_>>();
        visits.sort_by(|a, b| b.visit_date.cmp(&a.visit_date).then(b.id.cmp(&a.id)));
        Ok(visits)
    }

    async fn update_visit(
        &self,
        id: i32,
        changes: &VisitChanges,
    ) -> Result<Option<Visit>, Error> {
        let mut tables = self.tables();
        Ok(tables.visits.get_mut(&id).map(|visit| {
            changes.apply(visit);
            visit.clone()
        }))
    }

    async fn delete_visit(&self, id: i32) -> Result<bool, Error> {
        Ok(self.tables().visits.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::matches_search;
    use crate::model::Patient;

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let patient = Patient {
            id: 1,
            patient_id: "P001".to_string(),
            cnic: Some("12345-6789012-3".to_string()),
            phone: None,
            name: Some("John Doe".to_string()),
        };

        assert!(matches_search(&patient, "p00"));
        assert!(matches_search(&patient, "6789"));
        assert!(matches_search(&patient, "JOHN"));
        assert!(!matches_search(&patient, "jane"));
    }
}
