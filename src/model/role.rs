use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema,
)]
pub enum Role {
    Admin,
    Manager,
    TeamLead,
    Employee,
}

impl Role {
    /// Managers are not subject to attendance tracking.
    pub fn is_attendance_tracked(&self) -> bool {
        !matches!(self, Role::Manager)
    }
}

impl TryFrom<String> for Role {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
