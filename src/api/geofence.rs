use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::domain::geofence::Geofence;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UpdateGeofence {
    #[schema(example = 28.7041)]
    pub latitude: f64,
    #[schema(example = 77.1025)]
    pub longitude: f64,
    #[schema(example = 100.0)]
    pub radius_m: f64,
}

fn internal(e: sqlx::Error) -> actix_web::Error {
    tracing::error!(error = %e, "Geofence query failed");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/// The authoritative fence: latest stored row, or the configured default
/// when nothing has been written yet.
pub(crate) async fn effective_geofence(
    pool: &MySqlPool,
    config: &Config,
) -> Result<Geofence, sqlx::Error> {
    let row = sqlx::query_as::<_, Geofence>(
        "SELECT latitude, longitude, radius_m FROM geofence_config ORDER BY id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.unwrap_or(config.default_geofence))
}

/// Effective geofence configuration
#[utoipa::path(
    get,
    path = "/api/v1/geofence",
    responses(
        (status = 200, description = "Current geofence", body = Geofence),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Geofence"
)]
pub async fn get_geofence(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let fence = effective_geofence(pool.get_ref(), config.get_ref())
        .await
        .map_err(internal)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "config": fence })))
}

/// Update the geofence (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/geofence",
    request_body = UpdateGeofence,
    responses(
        (status = 200, description = "Geofence updated", body = Object, example = json!({
            "message": "Geofence configuration updated successfully"
        })),
        (status = 400, description = "Out-of-range latitude/longitude/radius"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Geofence"
)]
pub async fn update_geofence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateGeofence>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let fence = Geofence::validated(payload.latitude, payload.longitude, payload.radius_m)?;

    // Append-only: a new row becomes the latest and therefore authoritative.
    sqlx::query("INSERT INTO geofence_config (latitude, longitude, radius_m) VALUES (?, ?, ?)")
        .bind(fence.latitude)
        .bind(fence.longitude)
        .bind(fence.radius_m)
        .execute(pool.get_ref())
        .await
        .map_err(internal)?;

    tracing::info!(
        latitude = fence.latitude,
        longitude = fence.longitude,
        radius_m = fence.radius_m,
        "Geofence updated"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Geofence configuration updated successfully"
    })))
}
