//! Password sign-in and session management

use std::sync::Arc;

use async_trait::async_trait;
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::Session;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::{AccountStore, IdentityProvider, SessionEvent, SignedIn};

const EVENT_CAPACITY: usize = 64;

/// Identity provider backed by the account store
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    jwt_secret: String,
    session_expiry: i64,
    events: broadcast::Sender<SessionEvent>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub sid: String, // Session ID
    pub exp: i64,
    pub iat: i64,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountStore>, config: &Config) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts,
            jwt_secret: config.jwt.secret.clone(),
            session_expiry: config.jwt.session_expiry,
            events,
        }
    }

    fn encode_token(&self, session: &Session) -> AppResult<String> {
        let claims = Claims {
            sub: session.user_id.to_string(),
            sid: session.id.to_string(),
            exp: session.expires_at.timestamp(),
            iat: Utc::now().timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Decode a token and return its session id
    pub fn validate_token(&self, token: &str) -> AppResult<Uuid> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Uuid::parse_str(&data.claims.sid).map_err(|_| AppError::InvalidToken)
    }

    fn publish(&self, event: SessionEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl IdentityProvider for AuthService {
    async fn get_session(&self, token: &str) -> AppResult<Option<Session>> {
        let Ok(session_id) = self.validate_token(token) else {
            return Ok(None);
        };

        let session = self.accounts.find_session(session_id).await?;
        Ok(session.filter(|s| !s.is_expired(Utc::now())))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<SignedIn> {
        let account = self
            .accounts
            .find_account_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &account.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let session = Session {
            id: Uuid::new_v4(),
            user_id: account.id,
            email: account.email,
            expires_at: Utc::now() + Duration::seconds(self.session_expiry),
        };
        self.accounts.insert_session(&session).await?;
        let access_token = self.encode_token(&session)?;

        tracing::info!(user_id = %session.user_id, "Signed in");
        self.publish(SessionEvent::SignedIn {
            user_id: session.user_id,
        });

        Ok(SignedIn {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at: session.expires_at,
            user_id: session.user_id,
        })
    }

    async fn sign_out(&self, token: &str) -> AppResult<()> {
        let Ok(session_id) = self.validate_token(token) else {
            return Ok(());
        };
        let Some(session) = self.accounts.find_session(session_id).await? else {
            return Ok(());
        };

        self.accounts.delete_session(session.id).await?;
        tracing::info!(user_id = %session.user_id, "Signed out");
        self.publish(SessionEvent::SignedOut {
            user_id: session.user_id,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
