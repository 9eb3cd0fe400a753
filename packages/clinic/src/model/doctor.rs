use super::{required, required_if_present};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: i32,
    pub name: String,
    pub contact_number: String,
    pub location_id: i32,
    /// Free-text schedule, e.g. "Mon-Fri 9am-5pm"
    pub timings: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctor {
    pub name: String,
    pub contact_number: String,
    pub location_id: i32,
    pub timings: String,
}

impl CreateDoctor {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "Doctor name is required")?;
        required(&self.contact_number, "Contact number is required")?;
        required(&self.timings, "Timings are required")?;
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctor {
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub location_id: Option<i32>,
    #[serde(default)]
    pub timings: Option<String>,
}

impl UpdateDoctor {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required_if_present(&self.name, "Doctor name is required")?;
        required_if_present(&self.contact_number, "Contact number is required")?;
        required_if_present(&self.timings, "Timings are required")?;
        Ok(())
    }

    pub fn into_parts(self) -> (i32, DoctorChanges) {
        let changes = DoctorChanges {
            name: self.name,
            contact_number: self.contact_number,
            location_id: self.location_id,
            timings: self.timings,
        };
        (self.id, changes)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DoctorChanges {
    pub name: Option<String>,
    pub contact_number: Option<String>,
    pub location_id: Option<i32>,
    pub timings: Option<String>,
}

impl DoctorChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_number.is_none()
            && self.location_id.is_none()
            && self.timings.is_none()
    }

    pub fn apply(&self, doctor: &mut Doctor) {
        if let Some(name) = &self.name {
            doctor.name = name.clone();
        }
        if let Some(contact_number) = &self.contact_number {
            doctor.contact_number = contact_number.clone();
        }
        if let Some(location_id) = self.location_id {
            doctor.location_id = location_id;
        }
        if let Some(timings) = &self.timings {
            doctor.timings = timings.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn doctor_serializes_camel_case() {
        let doctor = Doctor {
            id: 1,
            name: "Dr. A".to_string(),
            contact_number: "0300-1234567".to_string(),
            location_id: 2,
            timings: "9-5".to_string(),
        };
        let value = serde_json::to_value(&doctor).unwrap();
        assert_eq!(value["contactNumber"], "0300-1234567");
        assert_eq!(value["locationId"], 2);
    }

    #[test]
    fn create_requires_every_string() {
        let input: CreateDoctor = serde_json::from_value(json!({
            "name": "Dr. A",
            "contactNumber": "",
            "locationId": 1,
            "timings": "9-5",
        }))
        .unwrap();
        assert_eq!(
            input.validate().unwrap_err().to_string(),
            "Contact number is required"
        );
    }

    #[test]
    fn update_rejects_empty_timings() {
        let input: UpdateDoctor =
            serde_json::from_value(json!({ "id": 1, "timings": "" })).unwrap();
        assert_eq!(
            input.validate().unwrap_err().to_string(),
            "Timings are required"
        );
    }

    #[test]
    fn changes_apply_location() {
        let input: UpdateDoctor =
            serde_json::from_value(json!({ "id": 1, "locationId": 7 })).unwrap();
        let (_, changes) = input.into_parts();

        let mut doctor = Doctor {
            id: 1,
            name: "Dr. A".to_string(),
            contact_number: "123".to_string(),
            location_id: 2,
            timings: "9-5".to_string(),
        };
        changes.apply(&mut doctor);
        assert_eq!(doctor.location_id, 7);
        assert_eq!(doctor.name, "Dr. A");
    }
}
