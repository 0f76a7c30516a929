//! Conversions from external infrastructure errors into domain errors.

use std::time::Duration;

use reqwest::Error as HttpError;
use rvm_domain::KioskError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub KioskError);

impl From<InfraError> for KioskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<KioskError> for InfraError {
    fn from(value: KioskError) -> Self {
        InfraError(value)
    }
}

impl InfraError {
    /// Convert a transport failure, naming the timeout budget when the request
    /// ran out of time.
    pub fn from_transport(err: HttpError, budget: Duration) -> Self {
        if err.is_timeout() {
            return InfraError(KioskError::Connectivity(format!(
                "request timed out after {}ms",
                budget.as_millis()
            )));
        }
        err.into()
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoKioskError {
    fn into_kiosk(self) -> KioskError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → KioskError */
/* -------------------------------------------------------------------------- */

impl IntoKioskError for HttpError {
    fn into_kiosk(self) -> KioskError {
        if self.is_timeout() {
            return KioskError::Connectivity("request timed out".into());
        }

        if self.is_connect() {
            return KioskError::Connectivity(format!("connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            return KioskError::Remote {
                code: status.as_u16(),
                body: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        if self.is_decode() {
            return KioskError::InvalidResponse(self.to_string());
        }

        if self.is_builder() {
            return KioskError::Config(format!("invalid request: {self}"));
        }

        KioskError::Connectivity(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_kiosk())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → KioskError */
/* -------------------------------------------------------------------------- */

impl IntoKioskError for serde_json::Error {
    fn into_kiosk(self) -> KioskError {
        KioskError::InvalidResponse(format!("malformed body: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_kiosk())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
