//! HTTP implementation of the directory contract

use async_trait::async_trait;
use std::sync::Arc;

use core_kernel::{DomainPort, PortError};
use domain_directory::{
    CreateUserRequest, DirectoryPort, DirectoryUser, MailDomain, MailMessage, NewMailMessage,
    UpdateDirectoryUser,
};

use crate::config::HttpConfig;
use crate::dto::directory::{
    ActualizarUsuarioRequest, CrearUsuarioRequest, DominioDto, EnviarMensajeRequest, MensajeDto,
    RestablecerContrasenaRequest, UsuarioDto,
};
use crate::guard::InFlightGuard;
use crate::session::SessionStore;
use crate::transport::Transport;

pub struct HttpDirectory {
    transport: Transport,
    provisioning_guard: InFlightGuard,
}

impl HttpDirectory {
    pub fn new(config: &HttpConfig, session: Arc<SessionStore>) -> Result<Self, PortError> {
        Ok(Self {
            transport: Transport::new(config, session)?,
            provisioning_guard: InFlightGuard::new(),
        })
    }
}

impl DomainPort for HttpDirectory {}

#[async_trait]
impl DirectoryPort for HttpDirectory {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, PortError> {
        let dtos: Vec<UsuarioDto> = self
            .transport
            .get_json("/directorio/usuarios", "consultar los usuarios")
            .await?;
        Ok(dtos.into_iter().map(DirectoryUser::from).collect())
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<DirectoryUser, PortError> {
        let _permit = self
            .provisioning_guard
            .try_begin("la creación del usuario")?;
        let dto: UsuarioDto = self
            .transport
            .post_json(
                "/directorio/usuarios",
                &CrearUsuarioRequest::from(request),
                "crear el usuario",
            )
            .await?;
        Ok(dto.into())
    }

    async fn update_user(
        &self,
        id: &str,
        update: &UpdateDirectoryUser,
    ) -> Result<DirectoryUser, PortError> {
        let dto: UsuarioDto = self
            .transport
            .put_json(
                &format!("/directorio/usuarios/{id}"),
                &ActualizarUsuarioRequest::from(update),
                "actualizar el usuario",
            )
            .await?;
        Ok(dto.into())
    }

    async fn delete_user(&self, id: &str) -> Result<(), PortError> {
        self.transport
            .delete(&format!("/directorio/usuarios/{id}"), "eliminar el usuario")
            .await
    }

    async fn reset_password(&self, id: &str, new_password: &str) -> Result<(), PortError> {
        let body = RestablecerContrasenaRequest {
            password: new_password.to_string(),
        };
        self.transport
            .post_empty(
                &format!("/directorio/usuarios/{id}/restablecer-contrasena"),
                &body,
                "restablecer la contraseña",
            )
            .await
    }

    async fn list_domains(&self) -> Result<Vec<MailDomain>, PortError> {
        let dtos: Vec<DominioDto> = self
            .transport
            .get_json("/directorio/dominios", "consultar los dominios")
            .await?;
        Ok(dtos.into_iter().map(MailDomain::from).collect())
    }

    async fn list_messages(&self, user_id: &str) -> Result<Vec<MailMessage>, PortError> {
        let dtos: Vec<MensajeDto> = self
            .transport
            .get_json(
                &format!("/directorio/usuarios/{user_id}/mensajes"),
                "consultar los mensajes",
            )
            .await?;
        Ok(dtos.into_iter().map(MailMessage::from).collect())
    }

    async fn search_messages(
        &self,
        user_id: &str,
        term: &str,
    ) -> Result<Vec<MailMessage>, PortError> {
        let dtos: Vec<MensajeDto> = self
            .transport
            .get_json_query(
                &format!("/directorio/usuarios/{user_id}/mensajes/buscar"),
                &[("q", term)],
                "buscar mensajes",
            )
            .await?;
        Ok(dtos.into_iter().map(MailMessage::from).collect())
    }

    async fn send_message(
        &self,
        user_id: &str,
        message: &NewMailMessage,
    ) -> Result<(), PortError> {
        self.transport
            .post_empty(
                &format!("/directorio/usuarios/{user_id}/mensajes/enviar"),
                &EnviarMensajeRequest::from(message),
                "enviar el mensaje",
            )
            .await
    }

    async fn mark_read(&self, user_id: &str, message_id: &str) -> Result<(), PortError> {
        self.transport
            .put_empty(
                &format!("/directorio/usuarios/{user_id}/mensajes/{message_id}/leido"),
                &serde_json::json!({}),
                "marcar el mensaje",
            )
            .await
    }
}
