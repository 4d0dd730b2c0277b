//! Directory service tests against an in-memory port double

use async_trait::async_trait;
use std::sync::Mutex;

use core_kernel::PortError;
use domain_directory::{
    CreateUserRequest, DirectoryPort, DirectoryService, DirectoryUser, MailDomain, MailMessage,
    NewDirectoryUser, NewMailMessage, UpdateDirectoryUser,
};

#[derive(Default)]
struct InMemoryDirectory {
    users: Mutex<Vec<DirectoryUser>>,
}

impl InMemoryDirectory {
    fn with_user(mail: &str) -> Self {
        let dir = Self::default();
        dir.users.lock().unwrap().push(DirectoryUser {
            id: "u-1".to_string(),
            display_name: "Existing".to_string(),
            given_name: "Existing".to_string(),
            surname: "User".to_string(),
            mail: Some(mail.to_string()),
            enabled: true,
        });
        dir
    }
}

impl core_kernel::DomainPort for InMemoryDirectory {}

#[async_trait]
impl DirectoryPort for InMemoryDirectory {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, PortError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<DirectoryUser, PortError> {
        let user = DirectoryUser {
            id: format!("u-{}", self.users.lock().unwrap().len() + 1),
            display_name: request.user.display_name.clone(),
            given_name: request.user.given_name.clone(),
            surname: request.user.surname.clone(),
            mail: Some(format!("{}@{}", request.mail_nickname, request.user.domain)),
            enabled: true,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: &str,
        update: &UpdateDirectoryUser,
    ) -> Result<DirectoryUser, PortError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| PortError::not_found("DirectoryUser", id))?;
        if let Some(enabled) = update.enabled {
            user.enabled = enabled;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str) -> Result<(), PortError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(PortError::not_found("DirectoryUser", id));
        }
        Ok(())
    }

    async fn reset_password(&self, _id: &str, _new_password: &str) -> Result<(), PortError> {
        Ok(())
    }

    async fn list_domains(&self) -> Result<Vec<MailDomain>, PortError> {
        Ok(vec![MailDomain {
            name: "colegio.mx".to_string(),
            is_default: true,
        }])
    }

    async fn list_messages(&self, _user_id: &str) -> Result<Vec<MailMessage>, PortError> {
        Ok(vec![])
    }

    async fn search_messages(
        &self,
        _user_id: &str,
        _term: &str,
    ) -> Result<Vec<MailMessage>, PortError> {
        Ok(vec![])
    }

    async fn send_message(
        &self,
        _user_id: &str,
        _message: &NewMailMessage,
    ) -> Result<(), PortError> {
        Ok(())
    }

    async fn mark_read(&self, _user_id: &str, _message_id: &str) -> Result<(), PortError> {
        Ok(())
    }
}

fn new_user() -> NewDirectoryUser {
    NewDirectoryUser {
        display_name: "José María García".to_string(),
        given_name: "José María".to_string(),
        surname: "García López".to_string(),
        domain: "colegio.mx".to_string(),
        initial_password: "Cambiar123!".to_string(),
    }
}

#[tokio::test]
async fn create_user_uses_short_nickname_when_free() {
    let service = DirectoryService::new(std::sync::Arc::new(InMemoryDirectory::default()));

    let created = service.create_user(new_user(), &[]).await.unwrap();
    assert_eq!(created.mail.as_deref(), Some("jose.garcia@colegio.mx"));
}

#[tokio::test]
async fn create_user_falls_back_on_collision_in_loaded_list() {
    let directory = InMemoryDirectory::with_user("jose.garcia@colegio.mx");
    let service = DirectoryService::new(std::sync::Arc::new(directory));
    let loaded = service.list_users().await.unwrap();

    let created = service.create_user(new_user(), &loaded).await.unwrap();
    assert_eq!(created.mail.as_deref(), Some("jose.garcialopez@colegio.mx"));
}

#[tokio::test]
async fn collision_check_only_consults_loaded_users() {
    // The same user exists in the directory, but the caller loaded nothing:
    // the short form is used, mirroring the provisioning screen.
    let directory = InMemoryDirectory::with_user("jose.garcia@colegio.mx");
    let service = DirectoryService::new(std::sync::Arc::new(directory));

    let created = service.create_user(new_user(), &[]).await.unwrap();
    assert_eq!(created.mail.as_deref(), Some("jose.garcia@colegio.mx"));
}

#[tokio::test]
async fn create_user_rejects_blank_domain() {
    let service = DirectoryService::new(std::sync::Arc::new(InMemoryDirectory::default()));
    let mut user = new_user();
    user.domain = "  ".to_string();

    let result = service.create_user(user, &[]).await;
    assert!(matches!(
        result,
        Err(domain_directory::DirectoryError::Validation(_))
    ));
}

#[tokio::test]
async fn send_message_requires_recipients() {
    let service = DirectoryService::new(std::sync::Arc::new(InMemoryDirectory::default()));
    let message = NewMailMessage::new(vec![], "Aviso", "cuerpo");

    let result = service.send_message("u-1", &message).await;
    assert!(matches!(
        result,
        Err(domain_directory::DirectoryError::Validation(_))
    ));
}
