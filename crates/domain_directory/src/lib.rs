//! Directory Domain - Tenant Users and Mailboxes
//!
//! Projections and operations for the institutional Azure AD tenant:
//! directory users, mail domains, and mailbox access, all consumed through
//! the directory service's HTTP contract. The only logic computed locally is
//! mail-nickname derivation for new accounts.

pub mod error;
pub mod mailbox;
pub mod nickname;
pub mod ports;
pub mod service;
pub mod user;

pub use error::DirectoryError;
pub use mailbox::{MailMessage, NewMailMessage};
pub use nickname::{mail_nickname, NicknameError};
pub use ports::{CreateUserRequest, DirectoryPort};
pub use service::DirectoryService;
pub use user::{DirectoryUser, MailDomain, NewDirectoryUser, UpdateDirectoryUser};
