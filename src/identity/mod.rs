//! Account management.
//!
//! The edit UI is only reachable while a user is signed in. Providers are
//! async so a networked implementation can slot in behind the same trait.

mod plugin;

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

pub use plugin::{
    AuthPlugin, AuthState, Identity, SignInRequest, SignOutRequest, SignUpRequest, is_authenticated,
};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Auth result type.
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("No user is signed in")]
    NotSignedIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: String,
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<User>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<User>;

    async fn sign_out(&self) -> AuthResult<()>;

    fn current_user(&self) -> Option<User>;
}

/// Rough shape check: one `@` with something on both sides and a dot in the domain
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

struct Account {
    uid: String,
    password: String,
}

/// Accounts held in process memory
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<User>>,
}

impl InMemoryIdentityProvider {
    fn set_current(&self, user: Option<User>) -> AuthResult<()> {
        *self
            .current
            .lock()
            .map_err(|e| AuthError::AuthFailed(e.to_string()))? = user;
        Ok(())
    }
}

#[async_trait::async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<User> {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AuthError::AuthFailed(format!("invalid email address {:?}", email)));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::AuthFailed(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let user = {
            let mut accounts = self
                .accounts
                .lock()
                .map_err(|e| AuthError::AuthFailed(e.to_string()))?;
            if accounts.contains_key(&email) {
                return Err(AuthError::AuthFailed(format!("{} is already registered", email)));
            }
            let uid = uuid::Uuid::new_v4().to_string();
            accounts.insert(
                email.clone(),
                Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                },
            );
            User { uid, email }
        };

        self.set_current(Some(user.clone()))?;
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<User> {
        let email = email.trim().to_lowercase();
        let user = {
            let accounts = self
                .accounts
                .lock()
                .map_err(|e| AuthError::AuthFailed(e.to_string()))?;
            match accounts.get(&email) {
                Some(account) if account.password == password => User {
                    uid: account.uid.clone(),
                    email,
                },
                _ => return Err(AuthError::AuthFailed("wrong email or password".to_string())),
            }
        };

        self.set_current(Some(user.clone()))?;
        Ok(user)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        if self.current_user().is_none() {
            return Err(AuthError::NotSignedIn);
        }
        self.set_current(None)
    }

    fn current_user(&self) -> Option<User> {
        self.current.lock().ok()?.clone()
    }
}
