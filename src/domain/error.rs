use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Every way an attendance, device-binding or geofence operation can be
/// refused. All variants are recoverable by the caller; none is fatal to the
/// process. Database failures are not part of this taxonomy — handlers map
/// those to 500 separately.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("No check-in recorded for this day")]
    NoCheckIn,

    #[error("Already checked out for this day")]
    AlreadyCheckedOut,

    #[error("Registration request already processed")]
    AlreadyProcessed,

    #[error("Device fingerprint missing")]
    FingerprintMissing,

    #[error("Device fingerprint does not match the approved device")]
    FingerprintMismatch,

    #[error("Location is outside the permitted area")]
    OutsideGeofence,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

impl actix_web::ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::NoCheckIn
            | DomainError::AlreadyCheckedOut
            | DomainError::AlreadyProcessed => StatusCode::BAD_REQUEST,
            DomainError::FingerprintMissing
            | DomainError::FingerprintMismatch
            | DomainError::OutsideGeofence => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn status_codes_follow_the_boundary_mapping() {
        assert_eq!(
            DomainError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::NotFound("employee").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(DomainError::NoCheckIn.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            DomainError::AlreadyCheckedOut.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::FingerprintMismatch.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            DomainError::OutsideGeofence.status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
