use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row per employee per calendar day (UNIQUE(employee_id, date)).
/// Check-out set implies check-in set; rows are never deleted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-08-24", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-08-24T09:02:11", value_type = Option<String>)]
    pub check_in: Option<NaiveDateTime>,
    pub check_in_lat: Option<f64>,
    pub check_in_lon: Option<f64>,
    #[schema(example = "2026-08-24T17:31:40", value_type = Option<String>)]
    pub check_out: Option<NaiveDateTime>,
    pub check_out_lat: Option<f64>,
    pub check_out_lon: Option<f64>,
    /// Opaque reference to uploaded photo evidence; file storage lives
    /// outside this service.
    pub photo_ref: Option<String>,
}
