use super::ClinicStore;
use crate::error::{Error, StoreError};
use crate::log::{SCHEMA, STORE};
use crate::model::{
    CreateDoctor, CreateLocation, Doctor, DoctorChanges, Location, LocationChanges, NewPatient,
    NewVisit, Patient, PatientChanges, Visit, VisitChanges,
};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row};
use tracing::{debug, info};

/// Idempotent DDL for the clinic tables
pub const SCHEMA_SQL: &str = include_str!("./sql/schema.sql");

const LOCATION_COLUMNS: &str = "id, name, address";
const DOCTOR_COLUMNS: &str = "id, name, contact_number, location_id, timings";
const PATIENT_COLUMNS: &str = "id, patient_id, cnic, phone, name";
const VISIT_COLUMNS: &str =
    "id, patient_id, doctor_id, visit_date, symptoms, diagnosis, prescription, notes, follow_up_date";

///
/// `ClinicStore` backed by a single PostgreSQL connection.
///
/// `tokio_postgres::Client` pipelines concurrent queries, so one store is
/// shared by every request.
///
pub struct PgStore {
    client: Client,
}

impl PgStore {
    pub fn new(client: Client) -> Self {
        PgStore { client }
    }

    pub async fn install_schema(&self) -> Result<(), Error> {
        debug!(target: SCHEMA, msg = "Installing schema");
        self.client.batch_execute(SCHEMA_SQL).await?;
        info!(target: SCHEMA, msg = "Schema installed");
        Ok(())
    }

    async fn query_all<T: FromRow>(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<T>, Error> {
        let rows = self.client.query(sql, params).await?;
        let records = rows
            .iter()
            .map(T::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn query_opt<T: FromRow>(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<T>, Error> {
        let row = self.client.query_opt(sql, params).await?;
        let record = row.as_ref().map(T::from_row).transpose()?;
        Ok(record)
    }

    async fn insert<T: FromRow>(
        &self,
        sql: &'static str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<T, Error> {
        let row = self
            .client
            .query_opt(sql, params)
            .await?
            .ok_or(StoreError::MissingRow { statement: sql })?;
        Ok(T::from_row(&row)?)
    }

    async fn delete(&self, table: &str, id: i32) -> Result<bool, Error> {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        let count = self.client.execute(&sql, &[&id]).await?;
        debug!(target: STORE, msg = "Delete", table, id, count);
        Ok(count > 0)
    }

    ///
    /// Runs `UPDATE .. SET .. RETURNING` for the assigned columns.
    /// With nothing assigned the current row is returned unchanged.
    ///
    async fn update<T: FromRow>(
        &self,
        table: &str,
        columns: &str,
        id: &i32,
        assignments: Assignments<'_>,
    ) -> Result<Option<T>, Error> {
        if assignments.is_empty() {
            let sql = format!("SELECT {columns} FROM {table} WHERE id = $1");
            return self.query_opt(&sql, &[id]).await;
        }

        let (sql, params) = assignments.into_statement(table, columns, id);
        debug!(target: STORE, msg = "Update", table, id, sql = %sql);
        self.query_opt(&sql, &params).await
    }
}

#[async_trait::async_trait]
impl ClinicStore for PgStore {
    async fn insert_location(&self, location: &CreateLocation) -> Result<Location, Error> {
        self.insert(
            "INSERT INTO locations (name, address) VALUES ($1, $2) RETURNING id, name, address",
            &[&location.name, &location.address],
        )
        .await
    }

    async fn locations(&self) -> Result<Vec<Location>, Error> {
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations ORDER BY id");
        self.query_all(&sql, &[]).await
    }

    async fn location(&self, id: i32) -> Result<Option<Location>, Error> {
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1");
        self.query_opt(&sql, &[&id]).await
    }

    async fn update_location(
        &self,
        id: i32,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, Error> {
        let mut assignments = Assignments::new();
        assignments.set_some("name", &changes.name);
        assignments.set_some("address", &changes.address);

        self.update("locations", LOCATION_COLUMNS, &id, assignments)
            .await
    }

    async fn delete_location(&self, id: i32) -> Result<bool, Error> {
        self.delete("locations", id).await
    }

    async fn count_doctors_at(&self, location_id: i32) -> Result<i64, Error> {
        let row = self
            .client
            .query_one(
                "SELECT COUNT(*) FROM doctors WHERE location_id = $1",
                &[&location_id],
            )
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn insert_doctor(&self, doctor: &CreateDoctor) -> Result<Doctor, Error> {
        self.insert(
            "INSERT INTO doctors (name, contact_number, location_id, timings)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, contact_number, location_id, timings",
            &[
                &doctor.name,
                &doctor.contact_number,
                &doctor.location_id,
                &doctor.timings,
            ],
        )
        .await
    }

    async fn doctors(&self) -> Result<Vec<Doctor>, Error> {
        self.query_all(
            "SELECT d.id, d.name, d.contact_number, d.location_id, d.timings
             FROM doctors d
             INNER JOIN locations l ON l.id = d.location_id
             ORDER BY d.id",
            &[],
        )
        .await
    }

    async fn doctor(&self, id: i32) -> Result<Option<Doctor>, Error> {
        let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1");
        self.query_opt(&sql, &[&id]).await
    }

    async fn doctors_at(&self, location_id: i32) -> Result<Vec<Doctor>, Error> {
        let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE location_id = $1 ORDER BY id");
        self.query_all(&sql, &[&location_id]).await
    }

    async fn update_doctor(
        &self,
        id: i32,
        changes: &DoctorChanges,
    ) -> Result<Option<Doctor>, Error> {
        let mut assignments = Assignments::new();
        assignments.set_some("name", &changes.name);
        assignments.set_some("contact_number", &changes.contact_number);
        assignments.set_some("location_id", &changes.location_id);
        assignments.set_some("timings", &changes.timings);

        self.update("doctors", DOCTOR_COLUMNS, &id, assignments).await
    }

    async fn delete_doctor(&self, id: i32) -> Result<bool, Error> {
        self.delete("doctors", id).await
    }

    async fn doctor_has_visits(&self, doctor_id: i32) -> Result<bool, Error> {
        let row = self
            .client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM visits WHERE doctor_id = $1)",
                &[&doctor_id],
            )
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn insert_patient(&self, patient: &NewPatient) -> Result<Patient, Error> {
        self.insert(
            "INSERT INTO patients (patient_id, cnic, phone, name)
             VALUES ($1, $2, $3, $4)
             RETURNING id, patient_id, cnic, phone, name",
            &[
                &patient.patient_id,
                &patient.cnic,
                &patient.phone,
                &patient.name,
            ],
        )
        .await
    }

    async fn patients(&self) -> Result<Vec<Patient>, Error> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY id");
        self.query_all(&sql, &[]).await
    }

    async fn patient(&self, id: i32) -> Result<Option<Patient>, Error> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1");
        self.query_opt(&sql, &[&id]).await
    }

    async fn last_patient_id(&self) -> Result<Option<i32>, Error> {
        let row = self
            .client
            .query_one("SELECT MAX(id) FROM patients", &[])
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn patients_with_contact(
        &self,
        cnic: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<Patient>, Error> {
        // NULL never compares equal, so a missing argument matches nothing
        let sql = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE cnic = $1 OR phone = $2 ORDER BY id"
        );
        self.query_all(&sql, &[&cnic, &phone]).await
    }

    async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, Error> {
        let pattern = like_pattern(query);
        let sql = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients
             WHERE patient_id = $1 OR patient_id ILIKE $2
                OR cnic = $1 OR cnic ILIKE $2
                OR phone = $1 OR phone ILIKE $2
                OR name ILIKE $2
             ORDER BY id"
        );
        self.query_all(&sql, &[&query, &pattern]).await
    }

    async fn update_patient(
        &self,
        id: i32,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, Error> {
        let mut assignments = Assignments::new();
        assignments.set_some("cnic", &changes.cnic);
        assignments.set_some("phone", &changes.phone);
        assignments.set_some("name", &changes.name);

        self.update("patients", PATIENT_COLUMNS, &id, assignments)
            .await
    }

    async fn insert_visit(&self, visit: &NewVisit) -> Result<Visit, Error> {
        self.insert(
            "INSERT INTO visits
                (patient_id, doctor_id, visit_date, symptoms, diagnosis, prescription, notes, follow_up_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, patient_id, doctor_id, visit_date, symptoms, diagnosis, prescription, notes, follow_up_date",
            &[
                &visit.patient_id,
                &visit.doctor_id,
                &visit.visit_date,
                &visit.symptoms,
                &visit.diagnosis,
                &visit.prescription,
                &visit.notes,
                &visit.follow_up_date,
            ],
        )
        .await
    }

    async fn visits(&self) -> Result<Vec<Visit>, Error> {
        let sql = format!("SELECT {VISIT_COLUMNS} FROM visits ORDER BY id");
        self.query_all(&sql, &[]).await
    }

    async fn visit(&self, id: i32) -> Result<Option<Visit>, Error> {
        let sql = format!("SELECT {VISIT_COLUMNS} FROM visits WHERE id = $1");
        self.query_opt(&sql, &[&id]).await
    }

    async fn visits_for_patient(&self, patient_id: i32) -> Result<Vec<Visit>, Error> {
        let sql = format!(
            "SELECT {VISIT_COLUMNS} FROM visits WHERE patient_id = $1 ORDER BY visit_date DESC, id DESC"
        );
        self.query_all(&sql, &[&patient_id]).await
    }

    async fn update_visit(
        &self,
        id: i32,
        changes: &VisitChanges,
    ) -> Result<Option<Visit>, Error> {
        let mut assignments = Assignments::new();
        assignments.set_some("patient_id", &changes.patient_id);
        assignments.set_some("doctor_id", &changes.doctor_id);
        assignments.set_some("visit_date", &changes.visit_date);
        assignments.set_some("symptoms", &changes.symptoms);
        assignments.set_some("diagnosis", &changes.diagnosis);
        assignments.set_some("prescription", &changes.prescription);
        assignments.set_some("notes", &changes.notes);
        assignments.set_some("follow_up_date", &changes.follow_up_date);

        self.update("visits", VISIT_COLUMNS, &id, assignments).await
    }

    async fn delete_visit(&self, id: i32) -> Result<bool, Error> {
        self.delete("visits", id).await
    }
}

///
/// Column assignments for a partial update, numbered `$1..$n` in insertion order
///
struct Assignments<'a> {
    columns: Vec<String>,
    params: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Assignments<'a> {
    fn new() -> Self {
        Assignments {
            columns: Vec::new(),
            params: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    ///
    /// Assigns the column only when the change is present.
    /// For nullable columns `T` is itself an `Option`, so `Some(None)` writes NULL.
    ///
    fn set_some<T: ToSql + Sync>(&mut self, column: &str, value: &'a Option<T>) {
        if let Some(value) = value {
            self.params.push(value);
            self.columns
                .push(format!("{column} = ${}", self.params.len()));
        }
    }

    fn into_statement(
        mut self,
        table: &str,
        returning: &str,
        id: &'a i32,
    ) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
        self.params.push(id);
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ${} RETURNING {returning}",
            self.columns.join(", "),
            self.params.len()
        );
        (sql, self.params)
    }
}

///
/// `%query%` with LIKE metacharacters escaped so the query matches literally
///
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error>;
}

impl FromRow for Location {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Location {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
        })
    }
}

impl FromRow for Doctor {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Doctor {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            contact_number: row.try_get("contact_number")?,
            location_id: row.try_get("location_id")?,
            timings: row.try_get("timings")?,
        })
    }
}

impl FromRow for Patient {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Patient {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            cnic: row.try_get("cnic")?,
            phone: row.try_get("phone")?,
            name: row.try_get("name")?,
        })
    }
}

impl FromRow for Visit {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Visit {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            doctor_id: row.try_get("doctor_id")?,
            visit_date: row.try_get("visit_date")?,
            symptoms: row.try_get("symptoms")?,
            diagnosis: row.try_get("diagnosis")?,
            prescription: row.try_get("prescription")?,
            notes: row.try_get("notes")?,
            follow_up_date: row.try_get("follow_up_date")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{like_pattern, Assignments, SCHEMA_SQL};

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("john"), "%john%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn assignments_number_params_in_order() {
        let name = Some("Main Clinic".to_string());
        let address: Option<String> = None;
        let notes: Option<Option<String>> = Some(None);
        let id = 9;

        let mut assignments = Assignments::new();
        assignments.set_some("name", &name);
        assignments.set_some("address", &address);
        assignments.set_some("notes", &notes);
        assert!(!assignments.is_empty());

        let (sql, params) = assignments.into_statement("locations", "id, name", &id);
        assert_eq!(
            sql,
            "UPDATE locations SET name = $1, notes = $2 WHERE id = $3 RETURNING id, name"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn empty_assignments() {
        let name: Option<String> = None;
        let mut assignments = Assignments::new();
        assignments.set_some("name", &name);
        assert!(assignments.is_empty());
    }

    #[test]
    fn schema_declares_unique_contact_columns() {
        assert!(SCHEMA_SQL.contains("patients_cnic_unique"));
        assert!(SCHEMA_SQL.contains("patients_phone_unique"));
        assert!(SCHEMA_SQL.contains("REFERENCES locations(id)"));
    }
}
