use super::Doctor;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Doctor,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LoginResponse {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Doctor>,
}

impl LoginResponse {
    pub fn superadmin() -> Self {
        LoginResponse {
            role: Role::Superadmin,
            doctor: None,
        }
    }

    pub fn doctor(doctor: Doctor) -> Self {
        LoginResponse {
            role: Role::Doctor,
            doctor: Some(doctor),
        }
    }
}
