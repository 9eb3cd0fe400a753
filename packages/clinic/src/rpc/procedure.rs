use crate::error::RpcError;
use std::fmt::{self, Display};
use std::str::FromStr;

/// Queries may be called over GET, mutations only over POST
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Query,
    Mutation,
}

macro_rules! define_procedures {
    ($(($variant:ident, $name:literal, $kind:ident)),* $(,)?) => {
        ///
        /// Every procedure exposed under `/rpc/{procedure}`
        ///
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum Procedure {
            $($variant,)*
        }

        impl Procedure {
            pub const ALL: &'static [Procedure] = &[$(Procedure::$variant,)*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Procedure::$variant => $name,)*
                }
            }

            pub fn kind(&self) -> Kind {
                match self {
                    $(Procedure::$variant => Kind::$kind,)*
                }
            }
        }

        impl FromStr for Procedure {
            type Err = RpcError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Procedure::$variant),)*
                    _ => Err(RpcError::UnknownProcedure { name: s.to_string() }),
                }
            }
        }
    };
}

define_procedures!(
    (Healthcheck, "healthcheck", Query),
    (Login, "login", Mutation),
    (CreateLocation, "createLocation", Mutation),
    (GetLocations, "getLocations", Query),
    (GetLocationById, "getLocationById", Query),
    (UpdateLocation, "updateLocation", Mutation),
    (DeleteLocation, "deleteLocation", Mutation),
    (CreateDoctor, "createDoctor", Mutation),
    (GetDoctors, "getDoctors", Query),
    (GetDoctorById, "getDoctorById", Query),
    (GetDoctorsByLocation, "getDoctorsByLocation", Query),
    (UpdateDoctor, "updateDoctor", Mutation),
    (DeleteDoctor, "deleteDoctor", Mutation),
    (CreatePatient, "createPatient", Mutation),
    (GetPatients, "getPatients", Query),
    (GetPatientById, "getPatientById", Query),
    (SearchPatients, "searchPatients", Query),
    (UpdatePatient, "updatePatient", Mutation),
    (CreateVisit, "createVisit", Mutation),
    (GetVisits, "getVisits", Query),
    (GetVisitById, "getVisitById", Query),
    (GetVisitsByPatient, "getVisitsByPatient", Query),
    (UpdateVisit, "updateVisit", Mutation),
    (DeleteVisit, "deleteVisit", Mutation),
);

impl Procedure {
    pub fn is_query(&self) -> bool {
        self.kind() == Kind::Query
    }
}

impl Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
