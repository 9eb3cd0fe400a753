use super::{non_empty, nullable, required, required_if_present, timestamp};
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

///
/// A single clinical encounter between one patient and one doctor.
/// `patient_id` here is the patient's internal id, not the `P001` identifier.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: i32,
    pub patient_id: i32,
    pub doctor_id: i32,
    pub visit_date: DateTime<Utc>,
    pub symptoms: String,
    pub diagnosis: String,
    pub prescription: String,
    pub notes: Option<String>,
    pub follow_up_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisit {
    pub patient_id: i32,
    pub doctor_id: i32,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub visit_date: Option<DateTime<Utc>>,
    pub symptoms: String,
    pub diagnosis: String,
    pub prescription: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub follow_up_date: Option<DateTime<Utc>>,
}

impl CreateVisit {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.symptoms, "Symptoms are required")?;
        required(&self.diagnosis, "Diagnosis is required")?;
        required(&self.prescription, "Prescription is required")?;
        Ok(())
    }

    ///
    /// Resolve defaults: a missing visit date is `now`, empty notes are NULL
    ///
    pub fn into_new(self, now: DateTime<Utc>) -> NewVisit {
        NewVisit {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            visit_date: self.visit_date.unwrap_or(now),
            symptoms: self.symptoms,
            diagnosis: self.diagnosis,
            prescription: self.prescription,
            notes: non_empty(self.notes),
            follow_up_date: self.follow_up_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewVisit {
    pub patient_id: i32,
    pub doctor_id: i32,
    pub visit_date: DateTime<Utc>,
    pub symptoms: String,
    pub diagnosis: String,
    pub prescription: String,
    pub notes: Option<String>,
    pub follow_up_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisit {
    pub id: i32,
    #[serde(default)]
    pub patient_id: Option<i32>,
    #[serde(default)]
    pub doctor_id: Option<i32>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub visit_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub prescription: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "timestamp::nullable")]
    pub follow_up_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateVisit {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required_if_present(&self.symptoms, "Symptoms are required")?;
        required_if_present(&self.diagnosis, "Diagnosis is required")?;
        required_if_present(&self.prescription, "Prescription is required")?;
        Ok(())
    }

    pub fn into_parts(self) -> (i32, VisitChanges) {
        let changes = VisitChanges {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            visit_date: self.visit_date,
            symptoms: self.symptoms,
            diagnosis: self.diagnosis,
            prescription: self.prescription,
            notes: self.notes,
            follow_up_date: self.follow_up_date,
        };
        (self.id, changes)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisitChanges {
    pub patient_id: Option<i32>,
    pub doctor_id: Option<i32>,
    pub visit_date: Option<DateTime<Utc>>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<Option<String>>,
    pub follow_up_date: Option<Option<DateTime<Utc>>>,
}

impl VisitChanges {
    pub fn is_empty(&self) -> bool {
        self.patient_id.is_none()
            && self.doctor_id.is_none()
            && self.visit_date.is_none()
            && self.symptoms.is_none()
            && self.diagnosis.is_none()
            && self.prescription.is_none()
            && self.notes.is_none()
            && self.follow_up_date.is_none()
    }

    pub fn apply(&self, visit: &mut Visit) {
        if let Some(patient_id) = self.patient_id {
            visit.patient_id = patient_id;
        }
        if let Some(doctor_id) = self.doctor_id {
            visit.doctor_id = doctor_id;
        }
        if let Some(visit_date) = self.visit_date {
            visit.visit_date = visit_date;
        }
        if let Some(symptoms) = &self.symptoms {
            visit.symptoms = symptoms.clone();
        }
        if let Some(diagnosis) = &self.diagnosis {
            visit.diagnosis = diagnosis.clone();
        }
        if let Some(prescription) = &self.prescription {
            visit.prescription = prescription.clone();
        }
        if let Some(notes) = &self.notes {
            visit.notes = notes.clone();
        }
        if let Some(follow_up_date) = self.follow_up_date {
            visit.follow_up_date = follow_up_date;
        }
    }
}
