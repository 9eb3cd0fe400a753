use super::{non_empty, nullable};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i32,
    /// Human-readable identifier such as `P001`, assigned once at creation
    pub patient_id: String,
    pub cnic: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CreatePatient {
    #[serde(default)]
    pub cnic: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CreatePatient {
    ///
    /// Empty strings are treated as absent
    ///
    pub fn normalize(self) -> Self {
        CreatePatient {
            cnic: non_empty(self.cnic),
            phone: non_empty(self.phone),
            name: non_empty(self.name),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_cnic = self.cnic.as_deref().is_some_and(|s| !s.is_empty());
        let has_phone = self.phone.as_deref().is_some_and(|s| !s.is_empty());

        if !has_cnic && !has_phone {
            return Err(ValidationError::MissingContact);
        }
        Ok(())
    }
}

///
/// A patient row ready for insert, with its allocated `patient_id`
///
#[derive(Clone, Debug, PartialEq)]
pub struct NewPatient {
    pub patient_id: String,
    pub cnic: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdatePatient {
    pub id: i32,
    #[serde(default, deserialize_with = "nullable")]
    pub cnic: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
}

impl UpdatePatient {
    pub fn into_parts(self) -> (i32, PatientChanges) {
        let changes = PatientChanges {
            cnic: self.cnic,
            phone: self.phone,
            name: self.name,
        };
        (self.id, changes)
    }
}

///
/// `None` leaves a column untouched, `Some(None)` clears it
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientChanges {
    pub cnic: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub name: Option<Option<String>>,
}

impl PatientChanges {
    pub fn is_empty(&self) -> bool {
        self.cnic.is_none() && self.phone.is_none() && self.name.is_none()
    }

    pub fn apply(&self, patient: &mut Patient) {
        if let Some(cnic) = &self.cnic {
            patient.cnic = cnic.clone();
        }
        if let Some(phone) = &self.phone {
            patient.phone = phone.clone();
        }
        if let Some(name) = &self.name {
            patient.name = name.clone();
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SearchPatients {
    #[serde(default)]
    pub query: String,
}
