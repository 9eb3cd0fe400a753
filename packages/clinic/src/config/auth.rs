use serde::Deserialize;

///
/// The two fixed accounts accepted by `login`.
/// A doctor session is bound to the doctor row with `doctor_profile_id`.
///
#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_superadmin")]
    pub superadmin: Credentials,

    #[serde(default = "AuthConfig::default_doctor")]
    pub doctor: Credentials,

    #[serde(default = "AuthConfig::default_doctor_profile_id")]
    pub doctor_profile_id: i32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl AuthConfig {
    pub fn default_superadmin() -> Credentials {
        Credentials::new("admin", "password")
    }

    pub fn default_doctor() -> Credentials {
        Credentials::new("doctor1", "password")
    }

    pub const fn default_doctor_profile_id() -> i32 {
        1
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            superadmin: AuthConfig::default_superadmin(),
            doctor: AuthConfig::default_doctor(),
            doctor_profile_id: AuthConfig::default_doctor_profile_id(),
        }
    }
}
