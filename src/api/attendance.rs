use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::domain::admission::{self, Attempt};
use crate::domain::error::DomainError;
use crate::domain::geofence::Coordinate;
use crate::model::attendance::AttendanceRecord;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use super::employee::fetch_employee;
use super::geofence::effective_geofence;

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 28.7042)]
    pub latitude: f64,
    #[schema(example = 77.1026)]
    pub longitude: f64,
    /// Fingerprint of the device making the attempt. Optional until the
    /// employee has an approved device binding.
    pub fingerprint: Option<String>,
    /// Reference to already-uploaded photo evidence.
    pub photo_ref: Option<String>,
    /// Client-side timestamp. Accepted for payload compatibility and
    /// discarded; the server clock governs what is stored.
    pub timestamp: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutRequest {
    #[schema(example = 28.7042)]
    pub latitude: f64,
    #[schema(example = 77.1026)]
    pub longitude: f64,
    pub fingerprint: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    pub attendance: Option<AttendanceRecord>,
}

fn internal(e: sqlx::Error) -> actix_web::Error {
    tracing::error!(error = %e, "Attendance query failed");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

async fn record_for_date(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, check_in, check_in_lat, check_in_lon,
               check_out, check_out_lat, check_out_lon, photo_ref
        FROM attendance_records
        WHERE employee_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// The most recent record with check-in set and check-out still unset. Used
/// when a check-out lands after midnight: the shift settles on the day the
/// check-in row was created.
async fn latest_open_record(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, check_in, check_in_lat, check_in_lon,
               check_out, check_out_lat, check_out_lon, photo_ref
        FROM attendance_records
        WHERE employee_id = ? AND check_in IS NOT NULL AND check_out IS NULL
        ORDER BY date DESC
        LIMIT 1
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "checked_in_at": "2026-08-24T09:02:11"
        })),
        (status = 400, description = "Invalid coordinate"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Device or location denied", body = Object, example = json!({
            "message": "Location is outside the permitted area"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckInRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let point = Coordinate::validated(payload.latitude, payload.longitude)?;
    let employee = fetch_employee(pool.get_ref(), employee_id).await?;
    let fence = effective_geofence(pool.get_ref(), config.get_ref())
        .await
        .map_err(internal)?;

    admission::admit(
        Attempt::CheckIn,
        &employee,
        &fence,
        payload.fingerprint.as_deref(),
        point,
        config.geofence_on_check_in,
        None,
    )?;

    // Server clock governs both the date key and the stored timestamp.
    let now = Local::now().naive_local();

    // The unique key on (employee_id, date) settles concurrent attempts:
    // one insert wins, the rest become the overwrite.
    sqlx::query(
        r#"
        INSERT INTO attendance_records
            (employee_id, date, check_in, check_in_lat, check_in_lon, photo_ref)
        VALUES (?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            check_in = VALUES(check_in),
            check_in_lat = VALUES(check_in_lat),
            check_in_lon = VALUES(check_in_lon),
            photo_ref = VALUES(photo_ref)
        "#,
    )
    .bind(employee_id)
    .bind(now.date())
    .bind(now)
    .bind(point.latitude)
    .bind(point.longitude)
    .bind(&payload.photo_ref)
    .execute(pool.get_ref())
    .await
    .map_err(internal)?;

    tracing::info!(employee_id, "Check-in recorded");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "checked_in_at": now
    })))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "checked_out_at": "2026-08-24T17:31:40"
        })),
        (status = 400, description = "No check-in or already checked out", body = Object, example = json!({
            "message": "No check-in recorded for this day"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Device or location denied"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckOutRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let point = Coordinate::validated(payload.latitude, payload.longitude)?;
    let employee = fetch_employee(pool.get_ref(), employee_id).await?;
    let fence = effective_geofence(pool.get_ref(), config.get_ref())
        .await
        .map_err(internal)?;

    let today = Local::now().date_naive();
    let record = match record_for_date(pool.get_ref(), employee_id, today)
        .await
        .map_err(internal)?
    {
        Some(rec) => Some(rec),
        None => latest_open_record(pool.get_ref(), employee_id)
            .await
            .map_err(internal)?,
    };

    admission::admit(
        Attempt::CheckOut,
        &employee,
        &fence,
        payload.fingerprint.as_deref(),
        point,
        config.geofence_on_check_out,
        record.as_ref(),
    )?;

    let record = match record {
        Some(rec) => rec,
        None => return Err(DomainError::NoCheckIn.into()),
    };

    let now = Local::now().naive_local();

    let result = sqlx::query(
        r#"
        UPDATE attendance_records
        SET check_out = ?, check_out_lat = ?, check_out_lon = ?
        WHERE id = ? AND check_out IS NULL
        "#,
    )
    .bind(now)
    .bind(point.latitude)
    .bind(point.longitude)
    .bind(record.id)
    .execute(pool.get_ref())
    .await
    .map_err(internal)?;

    if result.rows_affected() == 0 {
        // lost the race to a concurrent check-out on the same row
        return Err(DomainError::AlreadyCheckedOut.into());
    }

    tracing::info!(employee_id, "Check-out recorded");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "checked_out_at": now
    })))
}

/// Today's attendance record for the calling employee
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    responses(
        (status = 200, description = "Today's record, or null if none", body = TodayResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let record = record_for_date(pool.get_ref(), employee_id, Local::now().date_naive())
        .await
        .map_err(internal)?;

    Ok(HttpResponse::Ok().json(TodayResponse { attendance: record }))
}
