//! Directory tenant wire DTOs
//!
//! The directory service fronts the institutional tenant with Graph-style
//! English camelCase fields (`displayName`, `mailNickname`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use domain_directory::{
    CreateUserRequest, DirectoryUser, MailDomain, MailMessage, NewMailMessage, UpdateDirectoryUser,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioDto {
    pub id: String,
    pub display_name: String,
    pub given_name: String,
    pub surname: String,
    #[serde(default)]
    pub mail: Option<String>,
    pub account_enabled: bool,
}

impl From<UsuarioDto> for DirectoryUser {
    fn from(dto: UsuarioDto) -> Self {
        DirectoryUser {
            id: dto.id,
            display_name: dto.display_name,
            given_name: dto.given_name,
            surname: dto.surname,
            mail: dto.mail,
            enabled: dto.account_enabled,
        }
    }
}

/// Body of `POST /directorio/usuarios`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrearUsuarioRequest {
    pub display_name: String,
    pub given_name: String,
    pub surname: String,
    pub mail_nickname: String,
    pub user_principal_name: String,
    pub password: String,
    pub account_enabled: bool,
}

impl From<&CreateUserRequest> for CrearUsuarioRequest {
    fn from(request: &CreateUserRequest) -> Self {
        CrearUsuarioRequest {
            display_name: request.user.display_name.clone(),
            given_name: request.user.given_name.clone(),
            surname: request.user.surname.clone(),
            mail_nickname: request.mail_nickname.clone(),
            user_principal_name: format!("{}@{}", request.mail_nickname, request.user.domain),
            password: request.user.initial_password.clone(),
            account_enabled: true,
        }
    }
}

/// Body of `PUT /directorio/usuarios/{id}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarUsuarioRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_enabled: Option<bool>,
}

impl From<&UpdateDirectoryUser> for ActualizarUsuarioRequest {
    fn from(update: &UpdateDirectoryUser) -> Self {
        ActualizarUsuarioRequest {
            display_name: update.display_name.clone(),
            given_name: update.given_name.clone(),
            surname: update.surname.clone(),
            account_enabled: update.enabled,
        }
    }
}

/// Body of `POST /directorio/usuarios/{id}/restablecer-contrasena`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestablecerContrasenaRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominioDto {
    pub name: String,
    pub is_default: bool,
}

impl From<DominioDto> for MailDomain {
    fn from(dto: DominioDto) -> Self {
        MailDomain {
            name: dto.name,
            is_default: dto.is_default,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MensajeDto {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub received_date_time: DateTime<Utc>,
    pub is_read: bool,
    #[serde(default)]
    pub body_preview: String,
}

impl From<MensajeDto> for MailMessage {
    fn from(dto: MensajeDto) -> Self {
        MailMessage {
            id: dto.id,
            subject: dto.subject,
            from: dto.from,
            received_at: dto.received_date_time,
            is_read: dto.is_read,
            preview: dto.body_preview,
        }
    }
}

/// Body of `POST /directorio/usuarios/{id}/mensajes/enviar`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnviarMensajeRequest {
    pub to_recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl From<&NewMailMessage> for EnviarMensajeRequest {
    fn from(message: &NewMailMessage) -> Self {
        EnviarMensajeRequest {
            to_recipients: message.to.clone(),
            subject: message.subject.clone(),
            body: message.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_directory::NewDirectoryUser;

    #[test]
    fn test_create_request_composes_principal_name() {
        let request = CreateUserRequest {
            user: NewDirectoryUser {
                display_name: "José García".to_string(),
                given_name: "José".to_string(),
                surname: "García López".to_string(),
                domain: "colegio.mx".to_string(),
                initial_password: "Cambiar123!".to_string(),
            },
            mail_nickname: "jose.garcia".to_string(),
        };

        let dto = CrearUsuarioRequest::from(&request);
        assert_eq!(dto.user_principal_name, "jose.garcia@colegio.mx");
        assert_eq!(dto.mail_nickname, "jose.garcia");
        assert!(dto.account_enabled);

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["mailNickname"], "jose.garcia");
        assert_eq!(json["userPrincipalName"], "jose.garcia@colegio.mx");
    }

    #[test]
    fn test_usuario_maps_into_domain() {
        let json = r#"{
            "id": "c0ffee",
            "displayName": "Ana Torres",
            "givenName": "Ana",
            "surname": "Torres",
            "mail": "ana.torres@colegio.mx",
            "accountEnabled": false
        }"#;

        let user: DirectoryUser = serde_json::from_str::<UsuarioDto>(json).unwrap().into();
        assert_eq!(user.display_name, "Ana Torres");
        assert!(!user.enabled);
    }

    #[test]
    fn test_update_request_skips_unset_fields() {
        let update = UpdateDirectoryUser {
            enabled: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_value(ActualizarUsuarioRequest::from(&update)).unwrap();
        assert_eq!(json["accountEnabled"], false);
        assert!(json.get("displayName").is_none());
    }
}
