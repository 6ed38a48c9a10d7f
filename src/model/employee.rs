use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "name": "John Doe",
        "email": "john.doe@company.com",
        "device_id": "Device-7f3a",
        "device_fingerprint": "a81bc81b-dead-4e5d-abff-90865d1e13b1",
        "device_approved": true
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    /// Device identifier, present once a binding request has been approved.
    #[schema(example = "Device-7f3a", nullable = true)]
    pub device_id: Option<String>,

    /// Approved fingerprint. Only the binding-approval flow writes this.
    #[schema(nullable = true)]
    pub device_fingerprint: Option<String>,

    #[schema(example = false)]
    pub device_approved: bool,
}

impl Employee {
    /// The fingerprint this employee is bound to, if any. An employee counts
    /// as bound only once a request was approved and a fingerprint stored.
    pub fn bound_fingerprint(&self) -> Option<&str> {
        if self.device_approved {
            self.device_fingerprint.as_deref()
        } else {
            None
        }
    }
}
