//! Directory service contract
//!
//! `DirectoryPort` covers the tenant operations the client consumes:
//! directory users, mail domains, and mailbox access. The HTTP adapter in
//! `infra_http` implements it; tests use in-memory doubles.

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};

use crate::mailbox::{MailMessage, NewMailMessage};
use crate::user::{DirectoryUser, MailDomain, NewDirectoryUser, UpdateDirectoryUser};

/// Wire payload for user creation, with the nickname already derived
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub user: NewDirectoryUser,
    /// Derived `firstname.lastname` nickname; the mail address becomes
    /// `{mail_nickname}@{user.domain}`
    pub mail_nickname: String,
}

/// Backend contract for directory and mailbox management
#[async_trait]
pub trait DirectoryPort: DomainPort {
    // --- Users --------------------------------------------------------------

    /// Lists directory users
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, PortError>;

    /// Creates a directory user with the derived mail nickname
    async fn create_user(&self, request: &CreateUserRequest) -> Result<DirectoryUser, PortError>;

    /// Updates a directory user
    async fn update_user(
        &self,
        id: &str,
        update: &UpdateDirectoryUser,
    ) -> Result<DirectoryUser, PortError>;

    /// Deletes a directory user
    async fn delete_user(&self, id: &str) -> Result<(), PortError>;

    /// Resets a user's password
    async fn reset_password(&self, id: &str, new_password: &str) -> Result<(), PortError>;

    /// Lists the tenant's mail domains
    async fn list_domains(&self) -> Result<Vec<MailDomain>, PortError>;

    // --- Mailbox ------------------------------------------------------------

    /// Lists messages in a user's mailbox
    async fn list_messages(&self, user_id: &str) -> Result<Vec<MailMessage>, PortError>;

    /// Searches messages in a user's mailbox
    async fn search_messages(
        &self,
        user_id: &str,
        term: &str,
    ) -> Result<Vec<MailMessage>, PortError>;

    /// Sends a message from a user's mailbox
    async fn send_message(&self, user_id: &str, message: &NewMailMessage)
        -> Result<(), PortError>;

    /// Marks a message as read
    async fn mark_read(&self, user_id: &str, message_id: &str) -> Result<(), PortError>;
}
