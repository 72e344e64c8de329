//! User record

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    #[must_use]
    pub fn new(id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            discriminator: None,
            global_name: None,
            avatar: None,
            bot: false,
        }
    }

    /// Name to show in a member list or typing indicator
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_global_name() {
        let mut user = User::new(Snowflake::new(1), "alice");
        assert_eq!(user.display_name(), "alice");

        user.global_name = Some("Alice A.".to_string());
        assert_eq!(user.display_name(), "Alice A.");
    }

    #[test]
    fn test_deserialize_minimal() {
        let user: User = serde_json::from_str(r#"{"id":"7","username":"bob"}"#).unwrap();
        assert_eq!(user.id, Snowflake::new(7));
        assert!(!user.bot);
        assert!(user.avatar.is_none());
    }
}
