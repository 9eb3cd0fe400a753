use super::{required, required_if_present};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

///
/// A clinic site. Doctors are assigned to exactly one location.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Location {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CreateLocation {
    pub name: String,
    pub address: String,
}

impl CreateLocation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "Location name is required")?;
        required(&self.address, "Location address is required")?;
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateLocation {
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl UpdateLocation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required_if_present(&self.name, "Location name is required")?;
        required_if_present(&self.address, "Location address is required")?;
        Ok(())
    }

    pub fn into_parts(self) -> (i32, LocationChanges) {
        let changes = LocationChanges {
            name: self.name,
            address: self.address,
        };
        (self.id, changes)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationChanges {
    pub name: Option<String>,
    pub address: Option<String>,
}

impl LocationChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none()
    }

    pub fn apply(&self, location: &mut Location) {
        if let Some(name) = &self.name {
            location.name = name.clone();
        }
        if let Some(address) = &self.address {
            location.address = address.clone();
        }
    }
}
