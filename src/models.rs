use serde::{Deserialize, Serialize};

/// Claims carried by identity-provider tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// role name: Admin, Manager, TeamLead or Employee
    pub role: String,
    pub exp: usize,
    /// Present only if this user is linked to an employee record
    #[serde(default)]
    pub employee_id: Option<u64>,
}
