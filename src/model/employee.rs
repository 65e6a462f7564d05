use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "role": "Employee",
        "shift_start": "09:00 AM",
        "shift_end": "05:30 PM",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[sqlx(try_from = "String")]
    pub role: Role,

    #[schema(example = "09:00 AM")]
    pub shift_start: String,

    #[schema(example = "05:30 PM")]
    pub shift_end: String,

    #[schema(example = "active")]
    pub status: String,
}
