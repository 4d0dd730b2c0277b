//! Directory user projections
//!
//! Users live in the institutional Azure AD tenant; the client consumes them
//! only through the directory service's HTTP contract. Identities are the
//! tenant's opaque object-id strings.

use serde::{Deserialize, Serialize};

/// A directory user as returned by the tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Tenant object id
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Given name(s)
    pub given_name: String,
    /// Surname(s)
    pub surname: String,
    /// Primary mail address
    pub mail: Option<String>,
    /// Whether sign-in is enabled
    pub enabled: bool,
}

/// Request payload for creating a directory user
///
/// The mail nickname is not part of this payload; the service derives it
/// from the names and the loaded user list before calling the port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDirectoryUser {
    pub display_name: String,
    pub given_name: String,
    pub surname: String,
    /// Mail domain the address is created under
    pub domain: String,
    /// Initial password; the tenant forces a change at first sign-in
    pub initial_password: String,
}

/// Request payload for updating a directory user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDirectoryUser {
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub enabled: Option<bool>,
}

/// A mail domain available in the tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailDomain {
    pub name: String,
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serde() {
        let user = DirectoryUser {
            id: "c0ffee".to_string(),
            display_name: "José García".to_string(),
            given_name: "José".to_string(),
            surname: "García López".to_string(),
            mail: Some("jose.garcia@colegio.mx".to_string()),
            enabled: true,
        };
        let back: DirectoryUser =
            serde_json::from_str(&serde_json::to_string(&user).unwrap()).unwrap();
        assert_eq!(back.mail.as_deref(), Some("jose.garcia@colegio.mx"));
    }
}
