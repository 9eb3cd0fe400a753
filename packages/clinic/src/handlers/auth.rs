use crate::config::AuthConfig;
use crate::error::{AuthError, Error};
use crate::log::AUTHENTICATION;
use crate::model::{LoginInput, LoginResponse};
use crate::store::ClinicStore;
use tracing::{debug, warn};

///
/// Checks the two configured credential pairs.
///
/// The doctor login resolves the configured doctor profile, so a deleted
/// profile blocks the doctor role. No session is kept.
///
pub async fn login(
    store: &dyn ClinicStore,
    config: &AuthConfig,
    input: LoginInput,
) -> Result<LoginResponse, Error> {
    if config.superadmin.matches(&input.username, &input.password) {
        debug!(target: AUTHENTICATION, msg = "Superadmin login", username = %input.username);
        return Ok(LoginResponse::superadmin());
    }

    if config.doctor.matches(&input.username, &input.password) {
        let id = config.doctor_profile_id;
        return match store.doctor(id).await? {
            Some(doctor) => {
                debug!(target: AUTHENTICATION, msg = "Doctor login", username = %input.username, doctor_id = id);
                Ok(LoginResponse::doctor(doctor))
            }
            None => {
                warn!(target: AUTHENTICATION, msg = "Doctor profile not found", doctor_id = id);
                Err(AuthError::DoctorProfileNotFound.into())
            }
        };
    }

    warn!(target: AUTHENTICATION, msg = "Invalid credentials", username = %input.username);
    Err(AuthError::InvalidCredentials.into())
}
