//! Device push tokens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Subject, Timestamp, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Web => "web",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            "web" => Ok(Platform::Web),
            other => Err(ValidationError::invalid_format(
                "platform",
                format!("unknown platform '{}'", other),
            )),
        }
    }
}

/// A device registration. The token value is globally unique; re-registering
/// it moves it to the new owner and re-enables it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushToken {
    pub token: String,
    pub owner: Subject,
    pub platform: Platform,
    pub enabled: bool,
    pub updated_at: Timestamp,
}

impl PushToken {
    pub fn register(
        token: impl Into<String>,
        owner: Subject,
        platform: Platform,
    ) -> Result<Self, ValidationError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(ValidationError::empty_field("token"));
        }
        Ok(Self {
            token,
            owner,
            platform,
            enabled: true,
            updated_at: Timestamp::now(),
        })
    }

    /// Token value with the middle elided, safe for logs.
    pub fn redacted(token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() <= 12 {
            return "***".to_string();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SubjectId;

    #[test]
    fn register_trims_and_enables() {
        let owner = Subject::buyer(SubjectId::new("b1").unwrap());
        let token = PushToken::register(" ExponentPushToken[abc] ", owner, Platform::Ios).unwrap();

        assert_eq!(token.token, "ExponentPushToken[abc]");
        assert!(token.enabled);
    }

    #[test]
    fn register_rejects_blank_token() {
        let owner = Subject::buyer(SubjectId::new("b1").unwrap());
        assert!(PushToken::register("  ", owner, Platform::Web).is_err());
    }

    #[test]
    fn redaction_hides_the_middle() {
        assert_eq!(
            PushToken::redacted("ExponentPushToken[abcdefgh]"),
            "Expone...fgh]"
        );
        assert_eq!(PushToken::redacted("short"), "***");
    }
}
