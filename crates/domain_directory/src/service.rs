//! Directory application service
//!
//! Account provisioning composes the mail nickname locally before calling
//! the port: the collision check runs against the *currently loaded* user
//! list, not a directory query, mirroring the provisioning screen's
//! behavior.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::DirectoryError;
use crate::mailbox::{MailMessage, NewMailMessage};
use crate::nickname::mail_nickname;
use crate::ports::{CreateUserRequest, DirectoryPort};
use crate::user::{DirectoryUser, MailDomain, NewDirectoryUser, UpdateDirectoryUser};

/// Application service for directory and mailbox management
#[derive(Clone)]
pub struct DirectoryService {
    directory: Arc<dyn DirectoryPort>,
}

impl DirectoryService {
    pub fn new(directory: Arc<dyn DirectoryPort>) -> Self {
        Self { directory }
    }

    /// Lists directory users
    pub async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        Ok(self.directory.list_users().await?)
    }

    /// Creates a user, deriving the mail nickname against `loaded_users`
    ///
    /// The collision check compares the candidate address
    /// `{nickname}@{domain}` with the mail of every loaded user.
    #[instrument(skip(self, user, loaded_users))]
    pub async fn create_user(
        &self,
        user: NewDirectoryUser,
        loaded_users: &[DirectoryUser],
    ) -> Result<DirectoryUser, DirectoryError> {
        if user.domain.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "mail domain must not be blank".to_string(),
            ));
        }

        let nickname = mail_nickname(&user.given_name, &user.surname, |candidate| {
            let address = format!("{candidate}@{}", user.domain);
            loaded_users
                .iter()
                .any(|u| u.mail.as_deref() == Some(address.as_str()))
        })?;

        let created = self
            .directory
            .create_user(&CreateUserRequest {
                mail_nickname: nickname.clone(),
                user,
            })
            .await?;
        info!(nickname, "directory user created");
        Ok(created)
    }

    /// Updates a directory user
    pub async fn update_user(
        &self,
        id: &str,
        update: &UpdateDirectoryUser,
    ) -> Result<DirectoryUser, DirectoryError> {
        Ok(self.directory.update_user(id, update).await?)
    }

    /// Deletes a directory user
    pub async fn delete_user(&self, id: &str) -> Result<(), DirectoryError> {
        self.directory.delete_user(id).await?;
        info!(id, "directory user deleted");
        Ok(())
    }

    /// Resets a user's password
    pub async fn reset_password(&self, id: &str, new_password: &str) -> Result<(), DirectoryError> {
        if new_password.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "password must not be blank".to_string(),
            ));
        }
        Ok(self.directory.reset_password(id, new_password).await?)
    }

    /// Lists the tenant's mail domains
    pub async fn list_domains(&self) -> Result<Vec<MailDomain>, DirectoryError> {
        Ok(self.directory.list_domains().await?)
    }

    /// Lists a user's mailbox
    pub async fn list_messages(&self, user_id: &str) -> Result<Vec<MailMessage>, DirectoryError> {
        Ok(self.directory.list_messages(user_id).await?)
    }

    /// Searches a user's mailbox
    pub async fn search_messages(
        &self,
        user_id: &str,
        term: &str,
    ) -> Result<Vec<MailMessage>, DirectoryError> {
        Ok(self.directory.search_messages(user_id, term).await?)
    }

    /// Sends a message from a user's mailbox
    pub async fn send_message(
        &self,
        user_id: &str,
        message: &NewMailMessage,
    ) -> Result<(), DirectoryError> {
        if message.to.is_empty() {
            return Err(DirectoryError::Validation(
                "message must have at least one recipient".to_string(),
            ));
        }
        Ok(self.directory.send_message(user_id, message).await?)
    }

    /// Marks a message as read
    pub async fn mark_read(&self, user_id: &str, message_id: &str) -> Result<(), DirectoryError> {
        Ok(self.directory.mark_read(user_id, message_id).await?)
    }
}
