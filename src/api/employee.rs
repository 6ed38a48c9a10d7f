use crate::auth::auth::AuthUser;
use crate::domain::error::DomainError;
use crate::model::employee::Employee;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    /// Items per page
    pub per_page: Option<u32>,
    /// Search by employee code, name or email
    pub search: Option<String>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    #[schema(example = "Device-7f3a", nullable = true)]
    pub device_id: Option<String>,
    pub device_approved: bool,
    #[schema(example = "2026-08-24T09:02:11", value_type = Option<String>)]
    pub last_check_in: Option<NaiveDateTime>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<EmployeeSummary>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Loads an employee row or fails with the domain's NotFound. Shared by the
/// attendance and device handlers.
pub(crate) async fn fetch_employee(
    pool: &MySqlPool,
    employee_id: u64,
) -> actix_web::Result<Employee> {
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employee_code, name, email, device_id, device_fingerprint, device_approved
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    employee.ok_or_else(|| DomainError::NotFound("employee").into())
}

/// Employee listing with device and last check-in summary
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut like: Option<String> = None;

    if let Some(search) = query.search.as_deref() {
        where_sql.push_str(" AND (e.employee_code LIKE ? OR e.name LIKE ? OR e.email LIKE ?)");
        like = Some(format!("%{}%", search));
    }

    let count_sql = format!("SELECT COUNT(*) FROM employees e{}", where_sql);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(l) = &like {
        count_q = count_q.bind(l).bind(l).bind(l);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        r#"
        SELECT e.id, e.employee_code, e.name, e.email, e.device_id, e.device_approved,
               MAX(a.check_in) AS last_check_in
        FROM employees e
        LEFT JOIN attendance_records a ON a.employee_id = e.id
        {}
        GROUP BY e.id, e.employee_code, e.name, e.email, e.device_id, e.device_approved
        ORDER BY e.id
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    debug!(sql = %data_sql, page, per_page, "Fetching employees");

    let mut data_q = sqlx::query_as::<_, EmployeeSummary>(&data_sql);
    if let Some(l) = &like {
        data_q = data_q.bind(l).bind(l).bind(l);
    }
    data_q = data_q.bind(per_page as i64).bind(offset as i64);

    let employees = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee = fetch_employee(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}
