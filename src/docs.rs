use crate::api::attendance::{DayEntry, DayOverview};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee};
use crate::jobs::attendance::SweepReport;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::model::role::Role;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Human Resource Management (HRM) Attendance API

Role-based HR backend for **Admin**, **Manager**, **TeamLead** and **Employee** users.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles and shift times
- **Attendance**
  - Daily check-in (`Present` / `Late`)
  - Automatic `Absent` marking once an employee's shift end has passed
  - Day overview with `Pending` for employees not yet marked

### 🔐 Security
Endpoints expect a **JWT Bearer** token issued by the identity provider.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::today_overview,
        crate::api::attendance::my_attendance,
        crate::api::attendance::run_sweep,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            DayEntry,
            DayOverview,
            SweepReport,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse,
            Role
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
