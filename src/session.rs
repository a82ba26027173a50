//! Session variables carried on each request.
//!
//! Authentication itself happens upstream (the gateway's JWT middleware);
//! by the time a request reaches this service the caller's identity has
//! been flattened into headers:
//!
//! ```text
//! x-user-id: user-42
//! x-user-role: admin
//! ```

use std::collections::HashMap;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-user-role";

/// Role granting access to the admin surface.
pub const ADMIN_ROLE: &str = "admin";

/// Parsed identity variables from the incoming request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    variables: HashMap<String, String>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session from a map of variables.
    pub fn from_map(variables: HashMap<String, String>) -> Self {
        Self { variables }
    }

    /// Get the user id (`x-user-id`).
    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID_HEADER)
    }

    /// Get the caller's role (`x-user-role`).
    pub fn role(&self) -> Option<&str> {
        self.get(ROLE_HEADER)
    }

    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role() == Some(ADMIN_ROLE)
    }

    /// Get a session variable by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|v| v.as_str())
    }

    /// Set a session variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Check if a session variable exists.
    pub fn has(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}
