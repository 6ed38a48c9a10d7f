use crate::model::{attendance::AttendanceRecord, employee::Employee};

use super::{
    device,
    error::DomainError,
    geofence::{self, Coordinate, Geofence},
    ledger,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    CheckIn,
    CheckOut,
}

/// The admission decision for one check-in/check-out attempt.
///
/// Order is fixed: device binding first, then geofence (when required for
/// this attempt type), then the ledger's ordering rules. The first failing
/// step short-circuits, so a denied attempt never reaches the ledger and no
/// partial effect occurs. `today` is the record the ledger would mutate; it
/// is only consulted for check-out.
pub fn admit(
    attempt: Attempt,
    employee: &Employee,
    fence: &Geofence,
    presented_fingerprint: Option<&str>,
    point: Coordinate,
    require_geofence: bool,
    today: Option<&AttendanceRecord>,
) -> Result<(), DomainError> {
    device::verify(employee, presented_fingerprint)?;

    if require_geofence && !geofence::within_fence(point, fence.center(), fence.radius_m)? {
        return Err(DomainError::OutsideGeofence);
    }

    if attempt == Attempt::CheckOut {
        ledger::ensure_can_check_out(today)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FENCE: Geofence = Geofence {
        latitude: 28.7041,
        longitude: 77.1025,
        radius_m: 100.0,
    };

    const INSIDE: Coordinate = Coordinate {
        latitude: 28.7042,
        longitude: 77.1026,
    };

    const OUTSIDE: Coordinate = Coordinate {
        latitude: 28.7141,
        longitude: 77.1025,
    };

    fn unbound() -> Employee {
        Employee {
            id: 1,
            employee_code: "EMP-001".into(),
            name: "John Doe".into(),
            email: "john@company.com".into(),
            device_id: None,
            device_fingerprint: None,
            device_approved: false,
        }
    }

    fn bound(fingerprint: &str) -> Employee {
        Employee {
            device_id: Some("Device-7f3a".into()),
            device_fingerprint: Some(fingerprint.into()),
            device_approved: true,
            ..unbound()
        }
    }

    fn open_record() -> AttendanceRecord {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        AttendanceRecord {
            id: 7,
            employee_id: 1,
            date,
            check_in: date.and_hms_opt(9, 0, 0),
            check_in_lat: Some(INSIDE.latitude),
            check_in_lon: Some(INSIDE.longitude),
            check_out: None,
            check_out_lat: None,
            check_out_lon: None,
            photo_ref: None,
        }
    }

    #[test]
    fn unbound_employee_inside_fence_is_admitted() {
        let emp = unbound();
        assert_eq!(
            admit(Attempt::CheckIn, &emp, &FENCE, None, INSIDE, true, None),
            Ok(())
        );
    }

    #[test]
    fn fingerprint_mismatch_short_circuits_before_geofence() {
        let emp = bound("abc");
        // coordinate is valid and inside, but the device is wrong
        assert_eq!(
            admit(
                Attempt::CheckIn,
                &emp,
                &FENCE,
                Some("xyz"),
                INSIDE,
                true,
                None
            ),
            Err(DomainError::FingerprintMismatch)
        );
        // and the mismatch wins even when the point is outside too
        assert_eq!(
            admit(
                Attempt::CheckIn,
                &emp,
                &FENCE,
                Some("xyz"),
                OUTSIDE,
                true,
                None
            ),
            Err(DomainError::FingerprintMismatch)
        );
    }

    #[test]
    fn outside_fence_is_denied_only_when_required() {
        let emp = unbound();
        assert_eq!(
            admit(Attempt::CheckIn, &emp, &FENCE, None, OUTSIDE, true, None),
            Err(DomainError::OutsideGeofence)
        );
        assert_eq!(
            admit(Attempt::CheckIn, &emp, &FENCE, None, OUTSIDE, false, None),
            Ok(())
        );
    }

    #[test]
    fn check_out_outside_fence_passes_when_not_required() {
        let emp = unbound();
        let rec = open_record();
        assert_eq!(
            admit(
                Attempt::CheckOut,
                &emp,
                &FENCE,
                None,
                OUTSIDE,
                false,
                Some(&rec)
            ),
            Ok(())
        );
    }

    #[test]
    fn check_out_surfaces_ledger_errors() {
        let emp = unbound();
        assert_eq!(
            admit(Attempt::CheckOut, &emp, &FENCE, None, INSIDE, false, None),
            Err(DomainError::NoCheckIn)
        );

        let mut closed = open_record();
        closed.check_out = closed.date.and_hms_opt(17, 30, 0);
        assert_eq!(
            admit(
                Attempt::CheckOut,
                &emp,
                &FENCE,
                None,
                INSIDE,
                false,
                Some(&closed)
            ),
            Err(DomainError::AlreadyCheckedOut)
        );
    }

    #[test]
    fn bound_employee_with_matching_fingerprint_is_admitted() {
        let emp = bound("abc");
        assert_eq!(
            admit(
                Attempt::CheckIn,
                &emp,
                &FENCE,
                Some("abc"),
                INSIDE,
                true,
                None
            ),
            Ok(())
        );
    }
}
