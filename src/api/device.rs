use crate::auth::auth::AuthUser;
use crate::domain::device;
use crate::domain::error::DomainError;
use crate::model::device_registration::RegistrationStatus;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;
use uuid::Uuid;

use super::employee::fetch_employee;

#[derive(Deserialize, ToSchema)]
pub struct RegisterDevice {
    #[schema(example = "Device-7f3a")]
    pub device_id: String,
    /// Opaque client-generated fingerprint binding the session to one
    /// physical device.
    pub fingerprint: String,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct PendingRegistration {
    pub reg_id: String,
    pub employee_id: u64,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    pub device_id: String,
    #[schema(example = "2026-08-24T09:02:11", value_type = String)]
    pub request_date: NaiveDateTime,
}

fn internal(e: sqlx::Error) -> actix_web::Error {
    tracing::error!(error = %e, "Device registration query failed");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/// Submit a device-binding request
#[utoipa::path(
    post,
    path = "/api/v1/devices",
    request_body = RegisterDevice,
    responses(
        (status = 200, description = "Request submitted", body = Object, example = json!({
            "message": "Device registration request submitted",
            "registration_id": "a81bc81b-dead-4e5d-abff-90865d1e13b1"
        })),
        (status = 400, description = "Empty fingerprint"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Device"
)]
pub async fn register_device(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<RegisterDevice>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    device::validate_fingerprint(&payload.fingerprint)?;

    // Multiple concurrent pending requests per employee are permitted;
    // each submission is its own row.
    let reg_id = Uuid::new_v4().to_string();
    let now = Local::now().naive_local();

    sqlx::query(
        r#"
        INSERT INTO device_registrations
            (reg_id, employee_id, device_id, fingerprint, request_date, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&reg_id)
    .bind(employee_id)
    .bind(&payload.device_id)
    .bind(&payload.fingerprint)
    .bind(now)
    .bind(RegistrationStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(internal)?;

    tracing::info!(employee_id, reg_id = %reg_id, "Device registration submitted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Device registration request submitted",
        "registration_id": reg_id
    })))
}

/// Pending device registrations (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/devices/pending",
    responses(
        (status = 200, description = "Pending registrations", body = [PendingRegistration]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Device"
)]
pub async fn pending_registrations(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let pending = sqlx::query_as::<_, PendingRegistration>(
        r#"
        SELECT r.reg_id, r.employee_id, e.name AS employee_name, r.device_id, r.request_date
        FROM device_registrations r
        JOIN employees e ON e.id = r.employee_id
        WHERE r.status = ?
        ORDER BY r.request_date DESC
        "#,
    )
    .bind(RegistrationStatus::Pending.to_string())
    .fetch_all(pool.get_ref())
    .await
    .map_err(internal)?;

    Ok(HttpResponse::Ok().json(pending))
}

/// Distinguishes an unknown reg_id from one that already reached a terminal
/// state, after the guarded pending-only UPDATE matched no row.
async fn classify_missed_update(
    pool: &MySqlPool,
    reg_id: &str,
) -> Result<DomainError, sqlx::Error> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM device_registrations WHERE reg_id = ?)",
    )
    .bind(reg_id)
    .fetch_one(pool)
    .await?;

    Ok(if exists {
        DomainError::AlreadyProcessed
    } else {
        DomainError::NotFound("registration")
    })
}

/// Approve a device registration (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/devices/{reg_id}/approve",
    params(
        ("reg_id" = String, Path, description = "Registration ID to approve")
    ),
    responses(
        (status = 200, description = "Device approved", body = Object, example = json!({
            "message": "Device approved successfully"
        })),
        (status = 400, description = "Already processed", body = Object, example = json!({
            "message": "Registration request already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Registration not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Device"
)]
pub async fn approve_device(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let reg_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(internal)?;

    // pending-only guard serializes concurrent approvals on the same reg_id:
    // exactly one transition wins, the rest see zero rows.
    let result = sqlx::query(
        r#"
        UPDATE device_registrations
        SET status = ?
        WHERE reg_id = ? AND status = ?
        "#,
    )
    .bind(RegistrationStatus::Approved.to_string())
    .bind(&reg_id)
    .bind(RegistrationStatus::Pending.to_string())
    .execute(&mut *tx)
    .await
    .map_err(internal)?;

    if result.rows_affected() == 0 {
        let err = classify_missed_update(pool.get_ref(), &reg_id)
            .await
            .map_err(internal)?;
        return Err(err.into());
    }

    let (employee_id, device_id, fingerprint) = sqlx::query_as::<_, (u64, String, String)>(
        "SELECT employee_id, device_id, fingerprint FROM device_registrations WHERE reg_id = ?",
    )
    .bind(&reg_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(internal)?;

    sqlx::query(
        r#"
        UPDATE employees
        SET device_id = ?, device_fingerprint = ?, device_approved = 1
        WHERE id = ?
        "#,
    )
    .bind(&device_id)
    .bind(&fingerprint)
    .bind(employee_id)
    .execute(&mut *tx)
    .await
    .map_err(internal)?;

    tx.commit().await.map_err(internal)?;

    tracing::info!(employee_id, reg_id = %reg_id, "Device approved");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Device approved successfully"
    })))
}

/// Reject a device registration (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/devices/{reg_id}/reject",
    params(
        ("reg_id" = String, Path, description = "Registration ID to reject")
    ),
    responses(
        (status = 200, description = "Registration rejected", body = Object, example = json!({
            "message": "Device registration rejected"
        })),
        (status = 400, description = "Already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Registration not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Device"
)]
pub async fn reject_device(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let reg_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE device_registrations
        SET status = ?
        WHERE reg_id = ? AND status = ?
        "#,
    )
    .bind(RegistrationStatus::Rejected.to_string())
    .bind(&reg_id)
    .bind(RegistrationStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(internal)?;

    if result.rows_affected() == 0 {
        let err = classify_missed_update(pool.get_ref(), &reg_id)
            .await
            .map_err(internal)?;
        return Err(err.into());
    }

    tracing::info!(reg_id = %reg_id, "Device registration rejected");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Device registration rejected"
    })))
}

/// Binding state for the calling employee
#[utoipa::path(
    get,
    path = "/api/v1/devices/status",
    responses(
        (status = 200, description = "Current device binding", body = Object, example = json!({
            "device_id": "Device-7f3a",
            "device_approved": true
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Device"
)]
pub async fn device_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let employee = fetch_employee(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "device_id": employee.device_id,
        "device_approved": employee.device_approved
    })))
}
