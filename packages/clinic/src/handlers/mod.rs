//! Procedure implementations.
//!
//! Each handler takes the store explicitly, validates its typed input and
//! enforces the rules that span tables: patient id allocation, contact
//! uniqueness, foreign keys checked ahead of writes and delete guards.

pub mod auth;
pub mod doctor;
pub mod location;
pub mod patient;
pub mod visit;

pub use auth::login;
pub use doctor::{
    create_doctor, delete_doctor, get_doctor_by_id, get_doctors, get_doctors_by_location,
    update_doctor,
};
pub use location::{
    create_location, delete_location, get_location_by_id, get_locations, update_location,
};
pub use patient::{
    create_patient, get_patient_by_id, get_patients, next_patient_id, search_patients,
    update_patient,
};
pub use visit::{
    create_visit, delete_visit, get_visit_by_id, get_visits, get_visits_by_patient, update_visit,
};
