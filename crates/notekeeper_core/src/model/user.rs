//! Account profile as served by `GET /users/me`.

use super::note::deserialize_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only account projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Display name sent on registration: the local part of the email.
pub fn display_name_from_email(email: &str) -> String {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, _)) => local.to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{display_name_from_email, UserProfile};

    #[test]
    fn display_name_is_local_part() {
        assert_eq!(display_name_from_email("jane.doe@example.com"), "jane.doe");
        assert_eq!(display_name_from_email(" bob@x "), "bob");
        assert_eq!(display_name_from_email("no-at-sign"), "no-at-sign");
        assert_eq!(display_name_from_email("@host"), "");
    }

    #[test]
    fn profile_parses_server_shape() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"id": 4, "email": "t@t.com", "full_name": "Test User",
                "is_active": true, "created_at": "2024-05-05T05:05:05"}"#,
        )
        .unwrap();
        assert_eq!(profile.email, "t@t.com");
        assert_eq!(profile.full_name.as_deref(), Some("Test User"));
    }
}
