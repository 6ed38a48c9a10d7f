use crate::api::attendance::{CheckInRequest, CheckOutRequest, TodayResponse};
use crate::api::device::{PendingRegistration, RegisterDevice};
use crate::api::employee::{EmployeeListResponse, EmployeeQuery, EmployeeSummary};
use crate::api::geofence::UpdateGeofence;
use crate::domain::geofence::{Coordinate, Geofence};
use crate::model::attendance::AttendanceRecord;
use crate::model::device_registration::RegistrationStatus;
use crate::model::employee::Employee;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Geo-verified Attendance API",
        version = "1.0.0",
        description = r#"
## Location- and Device-verified Attendance Tracker

Employees check in and check out from a registered device; the server records
server-clock timestamps, GPS coordinates and optional photo evidence, subject
to geofence and device-binding policy.

### 🔹 Key Features
- **Attendance**
  - Daily check-in / check-out with coordinates, server time authoritative
- **Device Binding**
  - Submit a device for approval; admins approve or reject; once approved the
    device fingerprint is required on every attempt
- **Geofence**
  - Circular admissible region; admins adjust center and radius
- **Employee Management**
  - Listing with device binding and last check-in summary

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Device approval, geofence updates and employee listings require **Admin** or
**HR** roles.

### 📦 Response Format
- JSON-based RESTful responses
- Denials carry a `message` explaining the reason

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,

        crate::api::device::register_device,
        crate::api::device::pending_registrations,
        crate::api::device::approve_device,
        crate::api::device::reject_device,
        crate::api::device::device_status,

        crate::api::geofence::get_geofence,
        crate::api::geofence::update_geofence,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee
    ),
    components(
        schemas(
            CheckInRequest,
            CheckOutRequest,
            TodayResponse,
            AttendanceRecord,
            RegisterDevice,
            PendingRegistration,
            RegistrationStatus,
            UpdateGeofence,
            Coordinate,
            Geofence,
            Employee,
            EmployeeSummary,
            EmployeeQuery,
            EmployeeListResponse
        )
    ),
    tags(
        (name = "Attendance", description = "Check-in/check-out APIs"),
        (name = "Device", description = "Device binding APIs"),
        (name = "Geofence", description = "Geofence configuration APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;
