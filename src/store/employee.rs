use async_trait::async_trait;
use sqlx::MySqlPool;

use super::{EmployeeDirectory, ShiftAssignment};
use crate::model::role::Role;

#[derive(Clone)]
pub struct MySqlEmployeeDirectory {
    pool: MySqlPool,
}

impl MySqlEmployeeDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlEmployeeDirectory {
    async fn tracked_employees(&self) -> Result<Vec<ShiftAssignment>, sqlx::Error> {
        sqlx::query_as::<_, ShiftAssignment>(
            r#"
            SELECT id AS employee_id, role, shift_end
            FROM employees
            WHERE role <> ?
            ORDER BY id
            "#,
        )
        .bind(Role::Manager.as_ref())
        .fetch_all(&self.pool)
        .await
    }
}
