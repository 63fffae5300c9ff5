use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One user record as persisted and returned by the API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub created_at: DateTime<Utc>,
    pub display_name: String,
    pub email: String,
}

impl User {
    /// Build a record stamped with the current time.
    pub fn new(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            created_at: Utc::now(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// Zero-valued record returned for unknown ids in compatibility mode.
    /// `created_at` is `0001-01-01T00:00:00Z`.
    pub fn zero() -> Self {
        let created_at = NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_default();
        Self { created_at, display_name: String::new(), email: String::new() }
    }
}

/// Body of `POST /api/v1/users/`. Absent fields default to empty strings.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
}

/// Body of `PATCH /api/v1/users/{id}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub display_name: String,
}

/// Response of a successful create.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedUser {
    pub user_id: String,
}
