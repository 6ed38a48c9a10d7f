use crate::model::attendance::AttendanceRecord;

use super::error::DomainError;

/// Ordering gate for check-out against the day's record.
///
/// Check-in itself has no gate: a repeated check-in overwrites the earlier
/// one (documented permissive behavior, kept so a check-in can be corrected).
/// Check-out requires a prior check-in and refuses to run twice.
pub fn ensure_can_check_out(existing: Option<&AttendanceRecord>) -> Result<(), DomainError> {
    match existing {
        None => Err(DomainError::NoCheckIn),
        Some(rec) if rec.check_in.is_none() => Err(DomainError::NoCheckIn),
        Some(rec) if rec.check_out.is_some() => Err(DomainError::AlreadyCheckedOut),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn record(
        check_in: Option<NaiveDateTime>,
        check_out: Option<NaiveDateTime>,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            check_in,
            check_in_lat: check_in.map(|_| 28.7041),
            check_in_lon: check_in.map(|_| 77.1025),
            check_out,
            check_out_lat: check_out.map(|_| 28.7041),
            check_out_lon: check_out.map(|_| 77.1025),
            photo_ref: None,
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn check_out_without_any_record_fails() {
        assert_eq!(ensure_can_check_out(None), Err(DomainError::NoCheckIn));
    }

    #[test]
    fn check_out_with_unset_check_in_fails() {
        let rec = record(None, None);
        assert_eq!(
            ensure_can_check_out(Some(&rec)),
            Err(DomainError::NoCheckIn)
        );
    }

    #[test]
    fn check_out_after_check_in_is_allowed_once() {
        let open = record(Some(at(9, 0)), None);
        assert_eq!(ensure_can_check_out(Some(&open)), Ok(()));

        let closed = record(Some(at(9, 0)), Some(at(17, 30)));
        assert_eq!(
            ensure_can_check_out(Some(&closed)),
            Err(DomainError::AlreadyCheckedOut)
        );
    }
}
