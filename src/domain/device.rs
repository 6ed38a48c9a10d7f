use crate::model::employee::Employee;

use super::error::DomainError;

/// Device-binding verification.
///
/// Binding is progressive: an employee with no approved device is always
/// allowed through, fingerprint or not — a device only becomes mandatory
/// after the first approval. Once bound, the presented fingerprint must match
/// the stored one exactly.
pub fn verify(employee: &Employee, presented: Option<&str>) -> Result<(), DomainError> {
    let bound = match employee.bound_fingerprint() {
        Some(f) => f,
        None => return Ok(()),
    };

    match presented {
        None => Err(DomainError::FingerprintMissing),
        Some(p) if p.trim().is_empty() => Err(DomainError::FingerprintMissing),
        Some(p) if p != bound => Err(DomainError::FingerprintMismatch),
        Some(_) => Ok(()),
    }
}

/// Gate for new binding requests. The claimed fingerprint is opaque but must
/// not be empty.
pub fn validate_fingerprint(fingerprint: &str) -> Result<(), DomainError> {
    if fingerprint.trim().is_empty() {
        return Err(DomainError::validation("fingerprint must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(fingerprint: Option<&str>, approved: bool) -> Employee {
        Employee {
            id: 1,
            employee_code: "EMP-001".into(),
            name: "John Doe".into(),
            email: "john@company.com".into(),
            device_id: fingerprint.map(|_| "Device-7f3a".into()),
            device_fingerprint: fingerprint.map(str::to_owned),
            device_approved: approved,
        }
    }

    #[test]
    fn unbound_employee_is_always_allowed() {
        let emp = employee(None, false);
        assert_eq!(verify(&emp, None), Ok(()));
        assert_eq!(verify(&emp, Some("anything")), Ok(()));
    }

    #[test]
    fn pending_approval_still_counts_as_unbound() {
        // fingerprint on file but not yet approved
        let emp = employee(Some("abc"), false);
        assert_eq!(verify(&emp, Some("xyz")), Ok(()));
    }

    #[test]
    fn bound_employee_must_present_the_bound_fingerprint() {
        let emp = employee(Some("abc"), true);
        assert_eq!(verify(&emp, Some("abc")), Ok(()));
        assert_eq!(
            verify(&emp, Some("xyz")),
            Err(DomainError::FingerprintMismatch)
        );
        assert_eq!(verify(&emp, None), Err(DomainError::FingerprintMissing));
        assert_eq!(verify(&emp, Some("  ")), Err(DomainError::FingerprintMissing));
    }

    #[test]
    fn empty_fingerprint_is_rejected_at_submission() {
        assert!(validate_fingerprint("").is_err());
        assert!(validate_fingerprint("   ").is_err());
        assert!(validate_fingerprint("a81bc81b").is_ok());
    }
}
