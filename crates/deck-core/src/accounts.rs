//! Registration, login and profile lookup for presentation owners.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::input::{Credentials, Registration};
use crate::models::{AuthSession, User};
use crate::traits::{CredentialHasher, IdentityProvider, UserRepo};

pub const INVALID_CREDENTIALS: &str = "invalid credentials";
pub const DEFAULT_ROLE: &str = "user";

pub struct AccountService {
    users: Arc<dyn UserRepo>,
    hasher: Arc<dyn CredentialHasher>,
    identity: Arc<dyn IdentityProvider>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        hasher: Arc<dyn CredentialHasher>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            users,
            hasher,
            identity,
        }
    }

    pub async fn register(&self, registration: Registration) -> Result<AuthSession> {
        registration.validate()?;
        let email = normalize_email(&registration.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("email is already registered".into()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name: registration.name.trim().to_string(),
            email,
            password_hash: self.hasher.hash(&registration.password).await?,
            role: DEFAULT_ROLE.into(),
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(&user).await?;
        info!(user_id = %user.id, "user registered");

        let access_token = self.identity.issue(&user)?;
        Ok(AuthSession { user, access_token })
    }

    pub async fn login(&self, credentials: Credentials) -> Result<AuthSession> {
        credentials.validate()?;
        let mut user = self
            .users
            .find_by_email(&normalize_email(&credentials.email))
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        if !self
            .hasher
            .verify(&credentials.password, &user.password_hash)
            .await?
        {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        if !user.is_active {
            return Err(AppError::Forbidden("account is deactivated".into()));
        }

        let now = Utc::now();
        self.users.touch_last_login(user.id, now).await?;
        user.last_login_at = Some(now);
        info!(user_id = %user.id, "user logged in");

        let access_token = self.identity.issue(&user)?;
        Ok(AuthSession { user, access_token })
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("user not found".into()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
