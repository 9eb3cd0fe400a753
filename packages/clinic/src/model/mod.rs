//! Records persisted by the clinic and the typed inputs of every procedure.
//!
//! Inputs are deserialized from the RPC payload and checked with `validate()`
//! before any handler touches the store.

mod auth;
mod doctor;
mod location;
mod patient;
mod timestamp;
mod visit;

pub use auth::{LoginInput, LoginResponse, Role};
pub use doctor::{CreateDoctor, Doctor, DoctorChanges, UpdateDoctor};
pub use location::{CreateLocation, Location, LocationChanges, UpdateLocation};
pub use patient::{CreatePatient, NewPatient, Patient, PatientChanges, SearchPatients, UpdatePatient};
pub use timestamp::parse_timestamp;
pub use visit::{CreateVisit, NewVisit, UpdateVisit, Visit, VisitChanges};

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ById {
    pub id: i32,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ByLocation {
    pub location_id: i32,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ByPatient {
    pub patient_id: i32,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct DeleteResult {
    pub success: bool,
}

impl DeleteResult {
    pub fn new(success: bool) -> Self {
        DeleteResult { success }
    }
}

///
/// Required strings must contain at least one character
///
pub(crate) fn required(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required { message });
    }
    Ok(())
}

pub(crate) fn required_if_present(
    value: &Option<String>,
    message: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => required(value, message),
        None => Ok(()),
    }
}

///
/// Empty strings are stored as NULL
///
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

///
/// Distinguishes a missing key (`None`) from an explicit `null` (`Some(None)`)
/// Use with `#[serde(default, deserialize_with = "nullable")]`
///
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_clears_blank_strings() {
        assert_eq!(non_empty(Some("".to_string())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn required_rejects_empty() {
        assert_eq!(
            required("", "Name is required"),
            Err(ValidationError::Required {
                message: "Name is required"
            })
        );
        assert!(required(" ", "Name is required").is_ok());
        assert!(required_if_present(&None, "Name is required").is_ok());
    }
}
