//! Wire types for the external account service.
//!
//! The simulation only needs a yes/no "authenticated" answer before a
//! session starts; these types let a host decode the service's replies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoginStatus {
    LoggedIn,
    NotLoggedIn,
}

/// Reply to the session-check request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCheck {
    pub status: LoginStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SessionCheck {
    pub fn is_authenticated(&self) -> bool {
        self.status == LoginStatus::LoggedIn
    }
}

/// Body of a login or register request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    Success,
    Error,
}

/// Reply to login, register or logout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub status: AuthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthResponse {
    pub fn is_success(&self) -> bool {
        self.status == AuthStatus::Success
    }

    /// Text to show the user when the request failed.
    pub fn error_message(&self) -> Option<&str> {
        match self.status {
            AuthStatus::Success => None,
            AuthStatus::Error => Some(self.message.as_deref().unwrap_or("Authentication failed")),
        }
    }
}
