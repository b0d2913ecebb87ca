use std::error::Error;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The author of a message in the conversation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// Input from the user.
    User,
    /// Output from the model.
    Assistant,
    /// The result of a tool call.
    Tool,
}

impl Role {
    /// Returns the lowercase name of the role.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl Display for Role {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "tool" => Ok(Role::Tool),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

/// An error returned when parsing a [`Role`] from an unknown name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParseRoleError(String);

impl ParseRoleError {
    /// Returns the name that failed to parse.
    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid role `{}`, expected one of system, user, assistant, tool",
            self.0
        )
    }
}

impl Error for ParseRoleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        for role in [Role::System, Role::User, Role::Assistant, Role::Tool] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }

        let err = "moderator".parse::<Role>().unwrap_err();
        assert_eq!(err.name(), "moderator");
        assert!(err.to_string().contains("moderator"));
    }

    #[test]
    fn test_serde_name() {
        let value = serde_json::to_value(Role::Assistant).unwrap();
        assert_eq!(value, serde_json::json!("assistant"));

        let role: Result<Role, _> = serde_json::from_str("\"narrator\"");
        assert!(role.is_err());
    }
}
