//! Provider-normalized user profile.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single email address or photo URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileValue {
    pub value: String,
}

impl ProfileValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
}

/// The authenticated identity as reported by a provider, before the application
/// maps it to its own user type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub provider: String,
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<ProfileName>,
    pub emails: Vec<ProfileValue>,
    pub photos: Vec<ProfileValue>,
    /// The provider's payload as received.
    #[serde(rename = "_json")]
    pub raw: Value,
}

impl Profile {
    /// First email, if the provider shared one.
    pub fn email(&self) -> Option<&str> {
        self.emails.first().map(|email| email.value.as_str())
    }

    pub fn photo(&self) -> Option<&str> {
        self.photos.first().map(|photo| photo.value.as_str())
    }
}
