//! Remote service boundary: account management against the media backend.
//!
//! Each call distinguishes two failure layers. A [`TransportError`] means the
//! request never completed; an [`ApiResponse`] with a non-success status
//! means the service answered with an application-level error.

use crate::models::User;
use crate::{Error, Result};
use std::fmt;

/// Application status the service uses for success.
pub const STATUS_OK: u16 = 200;

/// The request could not be completed (network, I/O, protocol).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// Completed service response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub error: String,
    pub error_desc: String,
    pub body: T,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn ok(body: T) -> Self {
        Self {
            status: STATUS_OK,
            error: String::new(),
            error_desc: String::new(),
            body,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

impl<T: Default> ApiResponse<T> {
    #[must_use]
    pub fn failed(status: u16, error: impl Into<String>, error_desc: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            error_desc: error_desc.into(),
            body: T::default(),
        }
    }
}

/// Token exchange result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenGrant {
    pub user: User,
    pub access_token: String,
}

pub type ServiceResult<T> = std::result::Result<ApiResponse<T>, TransportError>;

/// Account operations of the remote media service.
pub trait RemoteService: Send + Sync {
    fn create_user(&self, user: &User, password: &str) -> ServiceResult<User>;

    fn get_token(&self, email: &str, password: &str) -> ServiceResult<TokenGrant>;

    fn logout(&self) -> ServiceResult<()>;

    fn delete_user(&self, password: &str) -> ServiceResult<()>;

    /// Authenticate subsequent calls.
    fn set_token(&self, token: &str);
}

/// Collapse both failure layers into [`Error`], logging the failure.
pub fn check<T>(action: &str, result: ServiceResult<T>) -> Result<T> {
    match result {
        Ok(response) if response.is_success() => Ok(response.body),
        Ok(response) => {
            log::error!(
                "{action} failed: {}: {} - {}",
                response.status,
                response.error,
                response.error_desc
            );
            Err(Error::Application {
                code: response.status,
                error: response.error,
                description: response.error_desc,
            })
        }
        Err(err) => {
            log::error!("{action} failed: {err}");
            Err(Error::Transport(err.message))
        }
    }
}

/// Register a new account. Returns the user as stored by the service.
pub fn create_user<S: RemoteService + ?Sized>(
    service: &S,
    email: &str,
    password: &str,
) -> Option<User> {
    let user = User::with_email(email);
    check("User creation", service.create_user(&user, password)).ok()
}

/// Exchange credentials for an access token. An empty token counts as failure.
pub fn get_token<S: RemoteService + ?Sized>(
    service: &S,
    email: &str,
    password: &str,
) -> Option<TokenGrant> {
    let grant = check("Fetching token", service.get_token(email, password)).ok()?;
    if grant.access_token.is_empty() {
        log::error!("Fetching token failed: empty access token");
        return None;
    }
    Some(grant)
}

pub fn sign_out<S: RemoteService + ?Sized>(service: &S) -> bool {
    check("Signing out", service.logout()).is_ok()
}

pub fn delete_user<S: RemoteService + ?Sized>(service: &S, password: &str) -> bool {
    check("Deleting user", service.delete_user(password)).is_ok()
}
